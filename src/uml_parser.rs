use winnow::prelude::*;
use winnow::ascii::{multispace0, space0, space1, till_line_ending};
use winnow::combinator::{alt, opt, preceded, separated};
use winnow::token::take_while;

use crate::uml_ast::*;

pub fn parse_uml(source: &str) -> Result<SourceFile, String> {
    let mut input = source;
    source_file(&mut input).map_err(|_| {
        let consumed = source.len() - input.len();
        let line = source[..consumed].matches('\n').count() + 1;
        let context = input.lines().next().unwrap_or("").trim();
        let context_display = if context.chars().count() > 40 {
            format!("{}...", context.chars().take(40).collect::<String>())
        } else {
            context.to_string()
        };
        format!("syntax error at line {line}: unexpected `{context_display}`")
    })
}

fn source_file(input: &mut &str) -> winnow::Result<SourceFile> {
    let items = items(input, false)?;
    Ok(SourceFile { items })
}

fn fail<T>(input: &mut &str) -> winnow::Result<T> {
    Err(winnow::error::ParserError::from_input(input))
}

/// Whitespace, newlines and `%%` comments.
fn trivia(input: &mut &str) -> winnow::Result<()> {
    loop {
        multispace0.parse_next(input)?;
        if !input.starts_with("%%") {
            return Ok(());
        }
        till_line_ending.parse_next(input)?;
    }
}

fn at_keyword(input: &str, keyword: &str) -> bool {
    input
        .strip_prefix(keyword)
        .is_some_and(|rest| rest.starts_with([' ', '\t', '{']))
}

/// Items up to end of input, or up to the closing brace of a package body.
fn items(input: &mut &str, closing: bool) -> winnow::Result<Vec<Item>> {
    let mut items = Vec::new();
    loop {
        trivia(input)?;
        if closing && input.starts_with('}') {
            "}".parse_next(input)?;
            return Ok(items);
        }
        if input.is_empty() {
            return if closing { fail(input) } else { Ok(items) };
        }
        items.push(item(input)?);
    }
}

fn item(input: &mut &str) -> winnow::Result<Item> {
    if at_keyword(input, "package") {
        package_decl.map(Item::Package).parse_next(input)
    } else if at_keyword(input, "enum") {
        enum_decl.map(Item::Enumeration).parse_next(input)
    } else if at_keyword(input, "association") || at_keyword(input, "associationclass") {
        association_decl.map(Item::Association).parse_next(input)
    } else {
        class_decl.map(Item::Class).parse_next(input)
    }
}

fn package_decl(input: &mut &str) -> winnow::Result<PackageDecl> {
    ("package", space1).parse_next(input)?;
    let name = identifier.parse_next(input)?;
    trivia(input)?;
    "{".parse_next(input)?;
    let items = items(input, true)?;
    Ok(PackageDecl {
        name: name.to_string(),
        items,
    })
}

fn enum_decl(input: &mut &str) -> winnow::Result<EnumDecl> {
    ("enum", space1).parse_next(input)?;
    let name = identifier.parse_next(input)?;
    trivia(input)?;
    "{".parse_next(input)?;

    let mut literals = Vec::new();
    loop {
        trivia(input)?;
        if input.starts_with('}') {
            "}".parse_next(input)?;
            break;
        }
        let literal = identifier.parse_next(input)?;
        literals.push(literal.to_string());
        trivia(input)?;
        opt(",").parse_next(input)?;
    }

    Ok(EnumDecl {
        name: name.to_string(),
        literals,
    })
}

fn class_decl(input: &mut &str) -> winnow::Result<ClassDecl> {
    let is_abstract = opt(("abstract", space1)).parse_next(input)?.is_some();
    ("class", space1).parse_next(input)?;
    let name = identifier.parse_next(input)?;
    let parents: Option<Vec<&str>> = opt(preceded(
        (space0, "<", space0),
        separated(1.., identifier, (space0, ",", space0)),
    ))
    .parse_next(input)?;

    trivia(input)?;
    let mut members = Vec::new();
    if input.starts_with('{') {
        "{".parse_next(input)?;
        loop {
            trivia(input)?;
            if input.starts_with('}') {
                "}".parse_next(input)?;
                break;
            }
            if input.is_empty() {
                return fail(input);
            }
            members.push(member.parse_next(input)?);
        }
    }

    Ok(ClassDecl {
        name: name.to_string(),
        is_abstract,
        parents: parents
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect(),
        members,
    })
}

#[derive(Debug)]
enum AssociationEntry {
    End(EndDecl),
    Member(Member),
}

fn association_decl(input: &mut &str) -> winnow::Result<AssociationDecl> {
    let is_class = alt((
        ("associationclass", space1).value(true),
        ("association", space0).value(false),
    ))
    .parse_next(input)?;
    let name = if is_class {
        identifier.parse_next(input)?
    } else {
        opt(identifier).parse_next(input)?.unwrap_or("")
    };
    trivia(input)?;
    "{".parse_next(input)?;

    let mut ends = Vec::new();
    let mut members = Vec::new();
    loop {
        trivia(input)?;
        if input.starts_with('}') {
            "}".parse_next(input)?;
            break;
        }
        if input.is_empty() {
            return fail(input);
        }
        match association_entry.parse_next(input)? {
            AssociationEntry::End(end) => ends.push(end),
            AssociationEntry::Member(m) => members.push(m),
        }
    }

    Ok(AssociationDecl {
        name: name.to_string(),
        is_class,
        ends,
        members,
    })
}

fn association_entry(input: &mut &str) -> winnow::Result<AssociationEntry> {
    alt((
        operation.map(AssociationEntry::Member),
        end_decl.map(AssociationEntry::End),
        attribute.map(AssociationEntry::Member),
    ))
    .parse_next(input)
}

fn member(input: &mut &str) -> winnow::Result<Member> {
    alt((operation, attribute)).parse_next(input)
}

fn operation(input: &mut &str) -> winnow::Result<Member> {
    let name = identifier.parse_next(input)?;
    (space0, "(", space0, ")").parse_next(input)?;
    let return_type = opt(preceded((space0, ":", space0), identifier)).parse_next(input)?;
    Ok(Member::Operation {
        name: name.to_string(),
        return_type: return_type.map(str::to_string),
    })
}

fn attribute(input: &mut &str) -> winnow::Result<Member> {
    let name = identifier.parse_next(input)?;
    (space0, ":", space0).parse_next(input)?;
    let type_name = identifier.parse_next(input)?;
    Ok(Member::Attribute {
        name: name.to_string(),
        type_name: type_name.to_string(),
    })
}

fn end_decl(input: &mut &str) -> winnow::Result<EndDecl> {
    let class = identifier.parse_next(input)?;
    space0.parse_next(input)?;
    let (min, max) = multiplicity.parse_next(input)?;
    let role = opt(preceded((space1, "role", space1), identifier)).parse_next(input)?;
    let ordered = opt((space1, "ordered")).parse_next(input)?.is_some();
    Ok(EndDecl {
        class: class.to_string(),
        min: min.to_string(),
        max: max.to_string(),
        role: role.map(str::to_string),
        ordered,
    })
}

/// `[min..max]`, either bound may be empty; `[n]` stands for `[n..n]`.
fn multiplicity<'s>(input: &mut &'s str) -> winnow::Result<(&'s str, &'s str)> {
    "[".parse_next(input)?;
    space0.parse_next(input)?;
    let min = bound.parse_next(input)?;
    space0.parse_next(input)?;
    let max = opt(preceded(("..", space0), bound)).parse_next(input)?;
    space0.parse_next(input)?;
    "]".parse_next(input)?;
    Ok((min, max.unwrap_or(min)))
}

fn bound<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(0.., |c: char| c.is_ascii_digit() || c == '*').parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // --- tokens ---

    #[test]
    fn parse_identifier_stops_at_colon() {
        let mut input = "age: int";
        assert_eq!(identifier(&mut input).unwrap(), "age");
        assert_eq!(input, ": int");
    }

    #[test]
    fn parse_multiplicity_range() {
        let mut input = "[0..*] rest";
        assert_eq!(multiplicity(&mut input).unwrap(), ("0", "*"));
        assert_eq!(input, " rest");
    }

    #[test]
    fn parse_multiplicity_empty_bounds() {
        let mut input = "[..]";
        assert_eq!(multiplicity(&mut input).unwrap(), ("", ""));
    }

    #[test]
    fn parse_multiplicity_single_value() {
        let mut input = "[1]";
        assert_eq!(multiplicity(&mut input).unwrap(), ("1", "1"));
    }

    #[test]
    fn trivia_skips_comments_and_blank_lines() {
        let mut input = "\n  %% a comment\n\n  class A";
        trivia(&mut input).unwrap();
        assert_eq!(input, "class A");
    }

    // --- members ---

    #[test]
    fn parse_attribute_member() {
        let mut input = "age : int";
        assert_eq!(
            member(&mut input).unwrap(),
            Member::Attribute {
                name: "age".into(),
                type_name: "int".into(),
            }
        );
    }

    #[test]
    fn parse_operation_with_return_type() {
        let mut input = "rent() : float";
        assert_eq!(
            member(&mut input).unwrap(),
            Member::Operation {
                name: "rent".into(),
                return_type: Some("float".into()),
            }
        );
    }

    #[test]
    fn parse_operation_without_return_type() {
        let mut input = "leave()\n";
        assert_eq!(
            member(&mut input).unwrap(),
            Member::Operation {
                name: "leave".into(),
                return_type: None,
            }
        );
        assert_eq!(input, "\n");
    }

    // --- association ends ---

    #[test]
    fn parse_end_with_role_and_ordered() {
        let mut input = "Person [0..*] role occupants ordered\n";
        let end = end_decl(&mut input).unwrap();
        assert_eq!(
            end,
            EndDecl {
                class: "Person".into(),
                min: "0".into(),
                max: "*".into(),
                role: Some("occupants".into()),
                ordered: true,
            }
        );
    }

    #[test]
    fn parse_end_role_does_not_cross_lines() {
        let mut input = "Person[1]\n    role";
        let end = end_decl(&mut input).unwrap();
        assert_eq!(end.role, None);
        assert_eq!(input, "\n    role");
    }

    // --- declarations ---

    #[test]
    fn parse_enum_multi_line() {
        let mut input = "enum Color {\n    Red,\n    Green,\n    Blue\n}";
        let decl = enum_decl(&mut input).unwrap();
        assert_eq!(decl.name, "Color");
        assert_eq!(decl.literals, vec!["Red", "Green", "Blue"]);
    }

    #[test]
    fn parse_enum_empty() {
        let mut input = "enum Nothing {}";
        let decl = enum_decl(&mut input).unwrap();
        assert!(decl.literals.is_empty());
    }

    #[test]
    fn parse_abstract_class_with_parents_and_members() {
        let mut input = "abstract class Student < Person, Taxpayer {\n    id : string\n    enroll() : boolean\n}";
        let decl = class_decl(&mut input).unwrap();
        assert!(decl.is_abstract);
        assert_eq!(decl.name, "Student");
        assert_eq!(decl.parents, vec!["Person", "Taxpayer"]);
        assert_eq!(decl.members.len(), 2);
    }

    #[test]
    fn parse_class_without_body() {
        let mut input = "class Residence\nclass Other";
        let decl = class_decl(&mut input).unwrap();
        assert_eq!(decl.name, "Residence");
        assert!(decl.members.is_empty());
        assert_eq!(input, "class Other");
    }

    #[test]
    fn parse_anonymous_association() {
        let mut input = "association {\n    Person [..]\n    Residence [..]\n}";
        let decl = association_decl(&mut input).unwrap();
        assert_eq!(decl.name, "");
        assert!(!decl.is_class);
        assert_eq!(decl.ends.len(), 2);
    }

    #[test]
    fn parse_anonymous_association_without_space_before_brace() {
        let file = parse_uml("class A\nassociation{ A [1] A [1] }\n").unwrap();
        let Item::Association(decl) = &file.items[1] else {
            panic!("expected association, got {:?}", file.items[1]);
        };
        assert_eq!(decl.name, "");
        assert_eq!(decl.ends.len(), 2);
    }

    #[test]
    fn parse_association_class_mixes_ends_and_members() {
        let mut input = "associationclass Job {\n    Person [0..*] role employee\n    Company [0..1]\n    salary : float\n    raise()\n}";
        let decl = association_decl(&mut input).unwrap();
        assert!(decl.is_class);
        assert_eq!(decl.name, "Job");
        assert_eq!(decl.ends.len(), 2);
        assert_eq!(decl.members.len(), 2);
    }

    #[test]
    fn parse_nested_packages() {
        let input = "\
package Outer {
    enum Kind { A, B }
    package Inner {
        class X
    }
    class Y
}
";
        let file = parse_uml(input).unwrap();
        assert_eq!(file.items.len(), 1);
        let Item::Package(outer) = &file.items[0] else {
            panic!("expected package, got {:?}", file.items[0]);
        };
        assert_eq!(outer.name, "Outer");
        assert_eq!(outer.items.len(), 3);
        assert!(matches!(&outer.items[1], Item::Package(p) if p.name == "Inner"));
    }

    #[test]
    fn parse_empty_source() {
        let file = parse_uml("  \n%% nothing here\n").unwrap();
        assert!(file.items.is_empty());
    }

    #[test]
    fn parse_error_reports_line() {
        let input = "package P {\n    class A\n    klass B\n}\n";
        let err = parse_uml(input).unwrap_err();
        assert!(err.contains("line 3"), "got: {err}");
        assert!(err.contains("klass B"), "got: {err}");
    }

    #[test]
    fn parse_error_unclosed_package() {
        let err = parse_uml("package P {\n    class A\n").unwrap_err();
        assert!(err.starts_with("syntax error"), "got: {err}");
    }
}
