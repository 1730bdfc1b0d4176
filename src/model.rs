use std::collections::HashMap;

use crate::error::Error;
use crate::uml_ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumerationId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssociationId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Package(PackageId),
    Class(ClassId),
    Enumeration(EnumerationId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub owned: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: String,
    pub is_abstract: bool,
    pub attributes: Vec<Attribute>,
    pub operations: Vec<Operation>,
    pub parents: Vec<ClassId>,
    /// One entry per end this class owns: the association it belongs to.
    pub owned_ends: Vec<AssociationId>,
    pub association: Option<AssociationId>,
}

impl Class {
    pub fn is_association_class(&self) -> bool {
        self.association.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    /// Empty when the association is anonymous.
    pub name: String,
    pub ends: Vec<AssociationEnd>,
    pub class: Option<ClassId>,
}

impl Association {
    pub fn is_association_class(&self) -> bool {
        self.class.is_some()
    }

    pub fn is_unspecified(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationEnd {
    pub owner: ClassId,
    pub min: String,
    pub max: String,
    pub ordered: bool,
    /// Empty when the end has no role name.
    pub role: String,
}

impl AssociationEnd {
    pub fn is_named(&self) -> bool {
        !self.role.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    pub name: String,
    pub literals: Vec<String>,
}

pub trait ModelHost {
    fn package(&self, id: PackageId) -> Option<&Package>;
    fn class(&self, id: ClassId) -> Option<&Class>;
    fn enumeration(&self, id: EnumerationId) -> Option<&Enumeration>;
    fn association(&self, id: AssociationId) -> Option<&Association>;

    fn require_package(&self, id: PackageId) -> Result<&Package, Error> {
        self.package(id).ok_or(Error::DanglingReference {
            kind: "package",
            index: id.0,
        })
    }

    fn require_class(&self, id: ClassId) -> Result<&Class, Error> {
        self.class(id).ok_or(Error::DanglingReference {
            kind: "class",
            index: id.0,
        })
    }

    fn require_enumeration(&self, id: EnumerationId) -> Result<&Enumeration, Error> {
        self.enumeration(id).ok_or(Error::DanglingReference {
            kind: "enumeration",
            index: id.0,
        })
    }

    fn require_association(&self, id: AssociationId) -> Result<&Association, Error> {
        self.association(id).ok_or(Error::DanglingReference {
            kind: "association",
            index: id.0,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub packages: Vec<Package>,
    pub classes: Vec<Class>,
    pub enumerations: Vec<Enumeration>,
    pub associations: Vec<Association>,
    roots: Vec<Element>,
    paths: HashMap<String, Element>,
}

impl ModelHost for Model {
    fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.0)
    }

    fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(id.0)
    }

    fn enumeration(&self, id: EnumerationId) -> Option<&Enumeration> {
        self.enumerations.get(id.0)
    }

    fn association(&self, id: AssociationId) -> Option<&Association> {
        self.associations.get(id.0)
    }
}

impl Model {
    pub fn build(source: &SourceFile) -> Result<Self, Error> {
        let mut builder = Builder::default();
        let roots = builder.declare_items(&source.items, "")?;
        builder.resolve(&source.items)?;
        builder.model.roots = roots;
        Ok(builder.model)
    }

    pub fn roots(&self) -> &[Element] {
        &self.roots
    }

    /// Look an element up by its `::`-separated qualified name.
    pub fn find(&self, path: &str) -> Option<Element> {
        self.paths.get(path).copied()
    }

    #[cfg(test)]
    pub fn class_named(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .position(|c| c.name == name)
            .map(ClassId)
    }
}

#[derive(Default)]
struct Builder {
    model: Model,
    class_ids: HashMap<String, ClassId>,
    declared_association_classes: Vec<ClassId>,
}

impl Builder {
    fn declare_items(&mut self, items: &[Item], prefix: &str) -> Result<Vec<Element>, Error> {
        let mut owned = Vec::new();
        for item in items {
            let element = match item {
                Item::Package(decl) => {
                    let id = PackageId(self.model.packages.len());
                    self.model.packages.push(Package {
                        name: decl.name.clone(),
                        owned: Vec::new(),
                    });
                    let path = qualify(prefix, &decl.name);
                    self.register_path(&path, Element::Package(id))?;
                    let children = self.declare_items(&decl.items, &path)?;
                    self.model.packages[id.0].owned = children;
                    Element::Package(id)
                }
                Item::Class(decl) => {
                    let id = self.declare_class(decl.name.clone(), decl.is_abstract, &decl.members)?;
                    self.register_path(&qualify(prefix, &decl.name), Element::Class(id))?;
                    Element::Class(id)
                }
                Item::Enumeration(decl) => {
                    let id = EnumerationId(self.model.enumerations.len());
                    self.model.enumerations.push(Enumeration {
                        name: decl.name.clone(),
                        literals: decl.literals.clone(),
                    });
                    self.register_path(&qualify(prefix, &decl.name), Element::Enumeration(id))?;
                    Element::Enumeration(id)
                }
                Item::Association(decl) if decl.is_class => {
                    let id = self.declare_class(decl.name.clone(), false, &decl.members)?;
                    self.register_path(&qualify(prefix, &decl.name), Element::Class(id))?;
                    self.declared_association_classes.push(id);
                    Element::Class(id)
                }
                Item::Association(_) => continue,
            };
            owned.push(element);
        }
        Ok(owned)
    }

    fn declare_class(
        &mut self,
        name: String,
        is_abstract: bool,
        members: &[Member],
    ) -> Result<ClassId, Error> {
        if self.class_ids.contains_key(&name) {
            return Err(Error::DuplicateClass(name));
        }
        let mut attributes = Vec::new();
        let mut operations = Vec::new();
        for member in members {
            match member {
                Member::Attribute { name, type_name } => attributes.push(Attribute {
                    name: name.clone(),
                    type_name: type_name.clone(),
                }),
                Member::Operation { name, return_type } => operations.push(Operation {
                    name: name.clone(),
                    return_type: return_type.clone(),
                }),
            }
        }
        let id = ClassId(self.model.classes.len());
        self.class_ids.insert(name.clone(), id);
        self.model.classes.push(Class {
            name,
            is_abstract,
            attributes,
            operations,
            parents: Vec::new(),
            owned_ends: Vec::new(),
            association: None,
        });
        Ok(id)
    }

    fn register_path(&mut self, path: &str, element: Element) -> Result<(), Error> {
        if self.model.paths.insert(path.to_string(), element).is_some() {
            return Err(Error::DuplicateName(path.to_string()));
        }
        Ok(())
    }

    fn lookup_class(&self, name: &str, context: impl FnOnce() -> String) -> Result<ClassId, Error> {
        self.class_ids
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownClass {
                name: name.to_string(),
                context: context(),
            })
    }

    fn resolve(&mut self, items: &[Item]) -> Result<(), Error> {
        let mut association_classes = std::mem::take(&mut self.declared_association_classes).into_iter();
        self.resolve_items(items, &mut association_classes)
    }

    fn resolve_items(
        &mut self,
        items: &[Item],
        association_classes: &mut impl Iterator<Item = ClassId>,
    ) -> Result<(), Error> {
        for item in items {
            match item {
                Item::Package(decl) => self.resolve_items(&decl.items, association_classes)?,
                Item::Class(decl) => {
                    let id = self.lookup_class(&decl.name, || format!("class `{}`", decl.name))?;
                    let parents = decl
                        .parents
                        .iter()
                        .map(|p| self.lookup_class(p, || format!("the parents of `{}`", decl.name)))
                        .collect::<Result<Vec<_>, _>>()?;
                    self.model.classes[id.0].parents = parents;
                }
                Item::Enumeration(_) => {}
                Item::Association(decl) => {
                    let class = if decl.is_class {
                        association_classes.next()
                    } else {
                        None
                    };
                    self.resolve_association(decl, class)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_association(
        &mut self,
        decl: &AssociationDecl,
        class: Option<ClassId>,
    ) -> Result<(), Error> {
        let label = if decl.name.is_empty() {
            "<anonymous>"
        } else {
            decl.name.as_str()
        };
        if decl.ends.len() < 2 {
            return Err(Error::TooFewEnds(label.to_string()));
        }
        if class.is_none() && !decl.members.is_empty() {
            return Err(Error::MembersOnAssociation(label.to_string()));
        }

        let id = AssociationId(self.model.associations.len());
        let mut ends = Vec::with_capacity(decl.ends.len());
        for end in &decl.ends {
            let owner = self.lookup_class(&end.class, || format!("association `{label}`"))?;
            self.model.classes[owner.0].owned_ends.push(id);
            ends.push(AssociationEnd {
                owner,
                min: end.min.clone(),
                max: end.max.clone(),
                ordered: end.ordered,
                role: end.role.clone().unwrap_or_default(),
            });
        }

        if let Some(class) = class {
            self.model.classes[class.0].association = Some(id);
        }
        self.model.associations.push(Association {
            name: decl.name.clone(),
            ends,
            class,
        });
        Ok(())
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}::{name}")
    }
}
