#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Package(PackageDecl),
    Class(ClassDecl),
    Enumeration(EnumDecl),
    Association(AssociationDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub is_abstract: bool,
    pub parents: Vec<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Attribute { name: String, type_name: String },
    Operation { name: String, return_type: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub literals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationDecl {
    /// Empty for anonymous associations.
    pub name: String,
    pub is_class: bool,
    pub ends: Vec<EndDecl>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndDecl {
    pub class: String,
    pub min: String,
    pub max: String,
    pub role: Option<String>,
    pub ordered: bool,
}
