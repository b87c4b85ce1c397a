//! Macros for technews tests.

use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{ext::IdentExt, parse_macro_input, punctuated::Punctuated, Ident, ItemFn, Stmt, Token};

/// Create a `#[test]` for each enabled backend that invokes the
/// annotated function with a fresh `Connection`.
///
/// The schema is migrated before the function runs unless the
/// `nomigrate` option is given.
#[proc_macro_attribute]
pub fn technews_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut func: ItemFn = parse_macro_input!(input as ItemFn);
    let fname = func.sig.ident.to_string();

    let options: Vec<TestOption> =
        parse_macro_input!(args with Punctuated::<TestOption, Token![,]>::parse_terminated)
            .into_iter()
            .collect();
    let migrate = !options.contains(&TestOption::NoMigrate);

    // Using technews_core paths because the macro is used by technews_core's own tests
    let prelude: Stmts = match syn::parse2(quote!(
        #[allow(unused_imports)]
        use technews_core::DataObject;
        #[allow(unused_imports)]
        use technews_core::DataObjectOps;
        #[allow(unused_imports)]
        use technews_core::db::{BackendConnection, ConnectionMethods};
        #[allow(unused_imports)]
        use technews_core::repo::UserRepository;
    )) {
        Ok(stmts) => stmts,
        Err(e) => return e.to_compile_error().into(),
    };
    func.block.stmts = prelude.into_iter().chain(func.block.stmts).collect();

    let backends: [(&str, &str); 1] = [("sqlite", "SQLiteTestInstance")];
    let tests = backends
        .into_iter()
        .map(|(backend, instance)| make_sync_test(&fname, backend, instance, migrate));

    quote! {
        #[cfg(test)]
        #func
        #(#tests)*
    }
    .into()
}

fn make_sync_test(
    fname_base: &str,
    backend_name: &str,
    instance_name: &str,
    migrate: bool,
) -> TokenStream2 {
    let fname_full = make_ident(&format!("{fname_base}_{backend_name}"));
    let fname = make_ident(fname_base);
    let instance_ident = make_ident(instance_name);
    quote! {
        cfg_if::cfg_if! {
            if #[cfg(feature = #backend_name)] {
                #[test]
                pub fn #fname_full () {
                    use technews_test_helper::*;
                    #instance_ident::run_test_sync(#fname, #migrate);
                }
            }
        }
    }
}

fn make_ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

/// Options for technews_test.
#[derive(PartialEq, Eq)]
enum TestOption {
    NoMigrate,
}

impl Parse for TestOption {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(<Ident as IdentExt>::peek_any) {
            let name: Ident = input.call(IdentExt::parse_any)?;
            if name == "nomigrate" {
                Ok(TestOption::NoMigrate)
            } else {
                Err(syn::Error::new(
                    name.span(),
                    "Unknown option for technews_test",
                ))
            }
        } else {
            Err(lookahead.error())
        }
    }
}

struct Stmts {
    stmts: Vec<Stmt>,
}

impl Parse for Stmts {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut stmts = Vec::new();
        while !input.is_empty() {
            stmts.push(input.parse()?);
        }
        Ok(Self { stmts })
    }
}

impl IntoIterator for Stmts {
    type Item = Stmt;
    type IntoIter = std::vec::IntoIter<Self::Item>;
    fn into_iter(self) -> Self::IntoIter {
        self.stmts.into_iter()
    }
}
