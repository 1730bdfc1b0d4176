use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::Options;
use crate::error::Error;
use crate::model::{Element, ModelHost, PackageId};
use crate::ocl_renderer::Emitter;

pub fn generate<H: ModelHost + ?Sized>(
    host: &H,
    selection: &[Element],
    options: &Options,
) -> Result<String, Error> {
    let mut emitter = Emitter::new(host, options);

    if selection.is_empty() {
        warn!("no element selected");
        emitter.line("-- No selected element !");
        emitter.line("-- Please select one !");
        return Ok(emitter.finish());
    }

    emitter.line(format!("model {}", options.model_name));
    emitter.blank();

    let mut covered = HashSet::new();
    for element in selection {
        if let Element::Package(id) = *element {
            collect_subpackages(host, id, &mut covered)?;
        }
    }

    let mut package_selected = false;
    let mut transformed = HashSet::new();
    for element in selection {
        match *element {
            Element::Package(id) => {
                package_selected = true;
                if covered.contains(&id) || !transformed.insert(id) {
                    debug!(package = id.0, "already covered by another selected package");
                    continue;
                }
                emitter.package_enumerations(id)?;
                emitter.package(id)?;
            }
            Element::Class(_) | Element::Enumeration(_) => {
                debug!(?element, "skipping selected element that is not a package");
            }
        }
    }

    if !package_selected {
        warn!("selection contains no package");
        emitter.line("-- No selected valid package !");
    }

    Ok(emitter.finish())
}

// Strict descendants only: a selected package is covered when an ancestor is selected too.
fn collect_subpackages<H: ModelHost + ?Sized>(
    host: &H,
    id: PackageId,
    out: &mut HashSet<PackageId>,
) -> Result<(), Error> {
    for element in &host.require_package(id)?.owned {
        if let Element::Package(sub) = *element {
            if out.insert(sub) {
                collect_subpackages(host, sub, out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::uml_parser::parse_uml;
    use pretty_assertions::assert_eq;

    fn model(input: &str) -> Model {
        Model::build(&parse_uml(input).unwrap()).unwrap()
    }

    #[test]
    fn empty_selection_reports_diagnostic() {
        let m = model("package P { class A }");
        let out = generate(&m, &[], &Options::default()).unwrap();
        assert_eq!(out, "-- No selected element !\n-- Please select one !\n");
    }

    #[test]
    fn selection_without_package_reports_diagnostic_after_header() {
        let m = model("class A");
        let out = generate(&m, m.roots(), &Options::default()).unwrap();
        assert_eq!(out, "model CyberResidences\n\n-- No selected valid package !\n");
    }

    #[test]
    fn enumerations_precede_classes() {
        let m = model(
            "\
package P {
    class Residence { color : Color }
    package Inner {
        enum Color { Red }
    }
}
",
        );
        let options = Options {
            model_name: "Town".into(),
            ..Options::default()
        };
        let out = generate(&m, m.roots(), &options).unwrap();
        assert_eq!(
            out,
            "\
model Town

enum Color
{
\tRed
}

class Residence
attributes
\tcolor : Color
end

"
        );
    }

    #[test]
    fn dedup_spans_selected_packages() {
        let m = model(
            "\
package P { class A }
package Q { class B }
association R { A [1] B [1] }
",
        );
        let out = generate(&m, m.roots(), &Options::default()).unwrap();
        assert_eq!(out.matches("association R between").count(), 1);
    }

    #[test]
    fn nested_selection_is_transformed_once() {
        let m = model(
            "\
package P {
    enum E { X }
    class A
    package Q {
        class B
    }
}
",
        );
        let selection = [
            m.find("P::Q").unwrap(),
            m.find("P").unwrap(),
            m.find("P").unwrap(),
        ];
        let out = generate(&m, &selection, &Options::default()).unwrap();
        assert_eq!(
            out,
            "model CyberResidences\n\nenum E\n{\n\tX\n}\n\nclass A\nend\n\nclass B\nend\n\n"
        );
    }
}
