use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::{Inheritance, Options};
use crate::error::Error;
use crate::model::*;
use crate::text::{basic_type_to_ocl, indented, upcase_first_letter};

pub fn abstract_keyword(class: &Class) -> &'static str {
    if class.is_abstract { "abstract " } else { "" }
}

/// `" < P1, P2"`, or an empty string for a class without parents.
pub fn inheritance<H: ModelHost + ?Sized>(
    host: &H,
    class: &Class,
    mode: Inheritance,
) -> Result<String, Error> {
    let parents = match mode {
        Inheritance::AllParents => class.parents.as_slice(),
        Inheritance::FirstParent => &class.parents[..class.parents.len().min(1)],
    };
    if parents.is_empty() {
        return Ok(String::new());
    }
    let names = parents
        .iter()
        .map(|&id| host.require_class(id).map(|p| p.name.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!(" < {}", names.join(", ")))
}

pub fn association_role_name(end: &AssociationEnd) -> String {
    if end.is_named() {
        format!(" role {}", upcase_first_letter(&end.role))
    } else {
        String::new()
    }
}

pub fn ordered_keyword(end: &AssociationEnd) -> &'static str {
    if end.ordered { " ordered" } else { "" }
}

pub fn association_keyword(association: &Association) -> &'static str {
    if association.is_association_class() {
        "associationclass "
    } else {
        "association "
    }
}

pub struct Emitter<'h, H: ModelHost + ?Sized> {
    host: &'h H,
    options: &'h Options,
    // Keyed by identity: anonymous associations have no name to key on.
    emitted: HashSet<AssociationId>,
    emitted_names: HashSet<String>,
    next_unnamed: usize,
    lines: Vec<String>,
}

impl<'h, H: ModelHost + ?Sized> Emitter<'h, H> {
    pub fn new(host: &'h H, options: &'h Options) -> Self {
        Self {
            host,
            options,
            emitted: HashSet::new(),
            emitted_names: HashSet::new(),
            next_unnamed: 0,
            lines: Vec::new(),
        }
    }

    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        if !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn enumeration(&mut self, id: EnumerationId) -> Result<(), Error> {
        let host = self.host;
        let enumeration = host.require_enumeration(id)?;
        self.line(format!("enum {}", enumeration.name));
        self.line("{");
        if let Some((last, rest)) = enumeration.literals.split_last() {
            for literal in rest {
                self.line(indented(&format!("{literal},")));
            }
            self.line(indented(last));
        }
        self.line("}");
        self.blank();
        Ok(())
    }

    pub fn class(&mut self, id: ClassId) -> Result<(), Error> {
        let host = self.host;
        let class = host.require_class(id)?;
        if !class.is_association_class() {
            let parents = inheritance(host, class, self.options.inheritance)?;
            self.line(format!(
                "{}class {}{}",
                abstract_keyword(class),
                class.name,
                parents
            ));
            self.class_body(class);
            self.line("end");
            self.blank();
        }
        if let Some(association) = class.association {
            self.association(association)?;
        }
        self.associations_of(id)
    }

    fn class_body(&mut self, class: &Class) {
        if !class.attributes.is_empty() {
            self.line("attributes");
            for attribute in &class.attributes {
                self.line(indented(&format!(
                    "{} : {}",
                    attribute.name,
                    basic_type_to_ocl(&attribute.type_name)
                )));
            }
        }
        if !class.operations.is_empty() {
            self.line("operations");
            for operation in &class.operations {
                let line = match &operation.return_type {
                    Some(ty) => format!("{}() : {}", operation.name, basic_type_to_ocl(ty)),
                    None => format!("{}()", operation.name),
                };
                self.line(indented(&line));
            }
        }
    }

    pub fn associations_of(&mut self, id: ClassId) -> Result<(), Error> {
        let host = self.host;
        let class = host.require_class(id)?;
        for &association in &class.owned_ends {
            self.association(association)?;
        }
        Ok(())
    }

    fn association(&mut self, id: AssociationId) -> Result<(), Error> {
        if !self.emitted.insert(id) {
            debug!(association = id.0, "already emitted");
            return Ok(());
        }
        let host = self.host;
        let association = host.require_association(id)?;

        let name = if association.is_unspecified() {
            let name = format!("unspecifiedName_{}", self.next_unnamed);
            self.next_unnamed += 1;
            name
        } else {
            association.name.clone()
        };
        if !self.emitted_names.insert(name.clone()) {
            warn!(%name, "distinct associations share a name");
        }
        debug!(%name, ends = association.ends.len(), "emitting association");

        self.line(format!("{}{} between", association_keyword(association), name));
        for end in &association.ends {
            let owner = host.require_class(end.owner)?;
            self.line(indented(&format!(
                "{}[{}..{}]{}{}",
                owner.name,
                end.min,
                end.max,
                association_role_name(end),
                ordered_keyword(end)
            )));
        }

        match association.class {
            Some(class_id) => {
                let class = host.require_class(class_id)?;
                self.class_body(class);
                self.line("end");
                self.blank();
                self.associations_of(class_id)?;
            }
            None => {
                self.line("end");
                self.blank();
            }
        }
        Ok(())
    }

    pub fn package(&mut self, id: PackageId) -> Result<(), Error> {
        let host = self.host;
        let package = host.require_package(id)?;
        debug!(package = %package.name, "transforming package");
        for element in &package.owned {
            match *element {
                Element::Class(class) => self.class(class)?,
                Element::Package(sub) => self.package(sub)?,
                Element::Enumeration(_) => {}
            }
        }
        Ok(())
    }

    pub fn package_enumerations(&mut self, id: PackageId) -> Result<(), Error> {
        let host = self.host;
        let package = host.require_package(id)?;
        for element in &package.owned {
            match *element {
                Element::Enumeration(enumeration) => self.enumeration(enumeration)?,
                Element::Package(sub) => self.package_enumerations(sub)?,
                Element::Class(_) => {}
            }
        }
        Ok(())
    }
}
