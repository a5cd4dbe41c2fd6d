use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Attribute, DataEnum, DeriveInput, Fields, Ident, LitStr, parse_macro_input};

use crate::utils;

/// One accepted spelling set: the canonical value first, then aliases.
struct ValueSpec {
    variant: Ident,
    canonical: String,
    aliases: Vec<String>,
}

/// Generates `parse`, `as_str`, `VALUES`, `EXPECTED`, `Display` and `FromStr`
/// for a unit-only enum used as an option value.
pub fn derive_cli_value_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let syn::Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "CliValue can only be derived for enums",
        ));
    };

    let ident = &input.ident;
    let option = option_name(ident, &input.attrs)?;
    let specs = value_specs(data)?;

    let canonical: Vec<LitStr> = specs.iter().map(|s| lit(&s.canonical)).collect();
    let expected = lit(
        &specs
            .iter()
            .map(|s| s.canonical.as_str())
            .collect::<Vec<_>>()
            .join("|"),
    );
    let option = lit(&option);

    let parse_arms = specs.iter().map(|spec| {
        let variant = &spec.variant;
        let spellings = std::iter::once(&spec.canonical)
            .chain(&spec.aliases)
            .map(|s| lit(s));
        quote! { #(#spellings)|* => Ok(Self::#variant), }
    });
    let name_arms = specs.iter().zip(&canonical).map(|(spec, name)| {
        let variant = &spec.variant;
        quote! { Self::#variant => #name, }
    });

    Ok(quote! {
        impl #ident {
            /// Canonical spellings, in declaration order.
            pub const VALUES: &'static [&'static str] = &[#(#canonical),*];
            /// `VALUES` joined with `|`, for usage text and errors.
            pub const EXPECTED: &'static str = #expected;

            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid value for --{}: {raw} (expected {})",
                        #option,
                        Self::EXPECTED
                    ))),
                }
            }

            pub const fn as_str(self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }

        impl std::str::FromStr for #ident {
            type Err = crate::Error;

            fn from_str(raw: &str) -> crate::Result<Self> {
                Self::parse(raw)
            }
        }

        impl std::fmt::Display for #ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    })
}

fn lit(value: &str) -> LitStr {
    LitStr::new(value, Span::call_site())
}

/// `#[cli_value(option = "...")]`, defaulting to the kebab-cased enum name.
fn option_name(ident: &Ident, attrs: &[Attribute]) -> syn::Result<String> {
    let mut option = utils::to_kebab_case(&ident.to_string());
    for attr in attrs.iter().filter(|a| a.path().is_ident("cli_value")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("option") {
                option = meta.value()?.parse::<LitStr>()?.value();
                Ok(())
            } else {
                Err(meta.error("unsupported cli_value attribute; expected option = \"...\""))
            }
        })?;
    }
    Ok(option)
}

fn value_specs(data: &DataEnum) -> syn::Result<Vec<ValueSpec>> {
    let mut specs: Vec<ValueSpec> = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "CliValue only supports unit variants",
            ));
        }

        let mut spec = ValueSpec {
            variant: variant.ident.clone(),
            canonical: utils::to_kebab_case(&variant.ident.to_string()),
            aliases: Vec::new(),
        };
        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("cli")) {
            attr.parse_nested_meta(|meta| {
                let value = meta.value()?.parse::<LitStr>()?.value();
                if meta.path.is_ident("name") {
                    spec.canonical = value;
                } else if meta.path.is_ident("alias") {
                    spec.aliases.push(value);
                } else {
                    return Err(meta.error("unsupported cli attribute; expected name/alias"));
                }
                Ok(())
            })?;
        }

        // Spellings are lowercased before matching; a clash would make an arm unreachable.
        let taken = specs
            .iter()
            .flat_map(|s| std::iter::once(&s.canonical).chain(&s.aliases));
        for existing in taken {
            if *existing == spec.canonical || spec.aliases.contains(existing) {
                return Err(syn::Error::new_spanned(
                    variant,
                    format!("CliValue spelling `{existing}` is used by two variants"),
                ));
            }
        }
        specs.push(spec);
    }
    Ok(specs)
}
