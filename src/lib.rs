pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod ocl_renderer;
pub mod text;
pub mod uml_ast;
pub mod uml_parser;

pub use config::{Inheritance, Options};
pub use error::Error;

use model::{Element, Model};

pub fn transform(input: &str) -> Result<String, Error> {
    transform_with_options(input, &[], &Options::default())
}

/// Parse `input`, select the elements named in `selection` (every top-level
/// element when empty) and generate their USE OCL specification.
pub fn transform_with_options(
    input: &str,
    selection: &[String],
    options: &Options,
) -> Result<String, Error> {
    let source = uml_parser::parse_uml(input).map_err(Error::Syntax)?;
    let model = Model::build(&source)?;
    let selected: Vec<Element> = if selection.is_empty() {
        model.roots().to_vec()
    } else {
        selection
            .iter()
            .map(|path| {
                model
                    .find(path)
                    .ok_or_else(|| Error::UnknownSelection(path.clone()))
            })
            .collect::<Result<_, _>>()?
    };
    driver::generate(&model, &selected, options)
}
