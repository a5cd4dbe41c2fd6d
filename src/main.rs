use std::time::Instant;

use log::{info, warn};

use tsp_greedy_core::{
    LengthCalculator, Result, TourOptions, logging, read_points, solve, write_tour,
};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = TourOptions::from_args()?;
    logging::init_logger(&options)?;

    info!("options: {options}");
    if !options.ignored_config_keys.is_empty() {
        warn!(
            "config: ignored unknown keys {}",
            options.ignored_config_keys.join(", ")
        );
    }

    let input_path = options.input_path()?;
    let points = read_points(input_path)?;
    info!("input: path={} n={}", input_path.display(), points.len());

    let result = solve(&points, &options)?;
    result.tour.tour_metrics(&LengthCalculator::new(&points));

    match options.output_path() {
        Some(path) => {
            write_tour(&result.tour.order, path)?;
            info!("output: wrote n={} path={}", result.tour.n(), path.display());
        }
        None => info!("output: no output path specified; not writing tour"),
    }

    info!(
        "done: length={} seed={} time={:.2}s",
        result.tour.length,
        result.seed,
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
