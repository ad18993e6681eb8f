//! Model Changes
//!
//! This module writes modified copies of model files. The executor uses a
//! [`ModelChangeApplier`] when changes are applied eagerly, before tasks run.
//!
//! [`XmlModelChangeApplier`] handles attribute changes on XML models. Targets are a
//! restricted form of XPath addressing one attribute of one element:
//!
//! ```text
//! /sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k1']/@value
//! ```
//!
//! Each step names an element and may carry `[@attr='value']` predicates. Namespace
//! prefixes are matched by local name only and `*` matches any element. A target
//! must select exactly one element; the attribute is overwritten or added.

use std::path::Path;

#[cfg(feature = "xml")]
use quick_xml::events::{BytesStart, Event};
#[cfg(feature = "xml")]
use quick_xml::{Reader, Writer};

use crate::sedml::data_model::ModelChange;
use crate::sedml::error::ModelChangeError;

/// Writes a modified copy of a model file.
pub trait ModelChangeApplier {
    /// Applies `changes` to the model at `source` and writes the result to `dest`.
    fn apply(
        &self,
        changes: &[ModelChange],
        source: &Path,
        dest: &Path,
    ) -> Result<(), ModelChangeError>;
}

/// Applies attribute changes to XML model files.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlModelChangeApplier;

impl ModelChangeApplier for XmlModelChangeApplier {
    fn apply(
        &self,
        changes: &[ModelChange],
        source: &Path,
        dest: &Path,
    ) -> Result<(), ModelChangeError> {
        let mut content =
            std::fs::read_to_string(source).map_err(|source_err| ModelChangeError::Io {
                path: source.to_path_buf(),
                source: source_err,
            })?;

        for change in changes {
            match change {
                ModelChange::Attribute(change) => {
                    let target = AttributeTarget::parse(&change.target)?;
                    content = set_attribute(&content, &target, &change.new_value)?;
                }
            }
        }

        std::fs::write(dest, content).map_err(|source| ModelChangeError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }
}

/// A parsed attribute target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTarget {
    pub steps: Vec<Step>,
    /// Qualified name of the attribute, as written in the target
    pub attribute: String,
}

/// One element step of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Local name of the element, or `*`
    pub name: String,
    /// `(local attribute name, value)` pairs the element must carry
    pub predicates: Vec<(String, String)>,
}

impl AttributeTarget {
    /// Parses a target of the form `/a/b[@id='x']/@attr`.
    pub fn parse(target: &str) -> Result<Self, ModelChangeError> {
        let invalid = || ModelChangeError::InvalidTarget(target.to_string());

        let rest = target.strip_prefix('/').ok_or_else(invalid)?;
        let mut segments = split_segments(rest).ok_or_else(invalid)?;

        let attribute = segments
            .pop()
            .and_then(|last| last.strip_prefix('@').map(str::to_string))
            .filter(|attr| !attr.is_empty())
            .ok_or_else(invalid)?;

        if segments.is_empty() {
            return Err(invalid());
        }

        let steps = segments
            .into_iter()
            .map(parse_step)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        Ok(Self { steps, attribute })
    }

    fn attribute_local_name(&self) -> &str {
        local_name(&self.attribute)
    }
}

/// Splits a path on `/`, ignoring separators inside quotes and brackets.
fn split_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, c) in path.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, '/') if depth == 0 => {
                segments.push(&path[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() || depth != 0 {
        return None;
    }
    segments.push(&path[start..]);

    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

fn parse_step(segment: &str) -> Option<Step> {
    let (name, mut rest) = match segment.find('[') {
        Some(idx) => (&segment[..idx], &segment[idx..]),
        None => (segment, ""),
    };

    if name.is_empty() || name.starts_with('@') {
        return None;
    }

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix("[@")?;
        let eq = inner.find('=')?;
        let attr = inner[..eq].trim();

        let value_part = inner[eq + 1..].trim_start();
        let q = value_part.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let value_end = value_part[1..].find(q)? + 1;
        let value = &value_part[1..value_end];

        let after = value_part[value_end + 1..].trim_start();
        rest = after.strip_prefix(']')?;

        predicates.push((local_name(attr).to_string(), value.to_string()));
    }

    Some(Step {
        name: local_name(name).to_string(),
        predicates,
    })
}

fn local_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

#[cfg(feature = "xml")]
fn step_matches(step: &Step, element: &BytesStart) -> Result<bool, ModelChangeError> {
    if step.name != "*" && element.local_name().as_ref() != step.name.as_bytes() {
        return Ok(false);
    }

    for (attr_name, expected) in &step.predicates {
        let mut found = false;
        for attr in element.attributes() {
            let attr = attr.map_err(|e| ModelChangeError::Xml(e.to_string()))?;
            if attr.key.local_name().as_ref() == attr_name.as_bytes() {
                found = attr.value.as_ref() == expected.as_bytes();
                break;
            }
        }
        if !found {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Rewrites an element with the target attribute set to `value`.
#[cfg(feature = "xml")]
fn with_attribute(
    element: &BytesStart,
    target: &AttributeTarget,
    value: &str,
) -> Result<BytesStart<'static>, ModelChangeError> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut updated = BytesStart::new(name);
    let mut replaced = false;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| ModelChangeError::Xml(e.to_string()))?;
        if attr.key.local_name().as_ref() == target.attribute_local_name().as_bytes() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            updated.push_attribute((key.as_str(), value));
            replaced = true;
        } else {
            updated.push_attribute(attr);
        }
    }

    if !replaced {
        updated.push_attribute((target.attribute.as_str(), value));
    }

    Ok(updated.into_owned())
}

/// Sets an attribute on the single element selected by `target`.
#[cfg(feature = "xml")]
pub fn set_attribute(
    content: &str,
    target: &AttributeTarget,
    value: &str,
) -> Result<String, ModelChangeError> {
    let xml_err = |e: quick_xml::Error| ModelChangeError::Xml(e.to_string());

    let mut reader = Reader::from_str(content);
    let mut writer = Writer::new(Vec::new());

    // Whether the element at each open depth matches the target path so far.
    let mut matched: Vec<bool> = Vec::new();
    let mut count = 0usize;

    loop {
        let event = reader.read_event().map_err(xml_err)?;
        match event {
            Event::Start(ref element) | Event::Empty(ref element) => {
                let depth = matched.len();
                let parent_matched = matched.last().copied().unwrap_or(true);
                let is_match = parent_matched
                    && depth < target.steps.len()
                    && step_matches(&target.steps[depth], element)?;
                let is_target = is_match && depth + 1 == target.steps.len();

                let is_empty = matches!(event, Event::Empty(_));
                if is_target {
                    count += 1;
                    let updated = with_attribute(element, target, value)?;
                    let updated = if is_empty {
                        Event::Empty(updated)
                    } else {
                        Event::Start(updated)
                    };
                    writer
                        .write_event(updated)
                        .map_err(|e| ModelChangeError::Xml(e.to_string()))?;
                } else {
                    writer
                        .write_event(event.borrow())
                        .map_err(|e| ModelChangeError::Xml(e.to_string()))?;
                }

                if !is_empty {
                    matched.push(is_match);
                }
            }
            Event::End(_) => {
                matched.pop();
                writer
                    .write_event(event)
                    .map_err(|e| ModelChangeError::Xml(e.to_string()))?;
            }
            Event::Eof => break,
            other => writer
                .write_event(other)
                .map_err(|e| ModelChangeError::Xml(e.to_string()))?,
        }
    }

    match count {
        0 => Err(ModelChangeError::TargetNotFound(target_text(target))),
        1 => String::from_utf8(writer.into_inner())
            .map_err(|e| ModelChangeError::Xml(e.to_string())),
        count => Err(ModelChangeError::AmbiguousTarget {
            target: target_text(target),
            count,
        }),
    }
}

#[cfg(not(feature = "xml"))]
pub fn set_attribute(
    _content: &str,
    target: &AttributeTarget,
    _value: &str,
) -> Result<String, ModelChangeError> {
    Err(ModelChangeError::Unsupported(format!(
        "XML support is disabled, cannot apply '{}'",
        target_text(target)
    )))
}

/// Renders a parsed target back into its path form.
fn target_text(target: &AttributeTarget) -> String {
    let mut text = String::new();
    for step in &target.steps {
        text.push('/');
        text.push_str(&step.name);
        for (attr, value) in &step.predicates {
            text.push_str(&format!("[@{attr}='{value}']"));
        }
    }
    text.push_str("/@");
    text.push_str(&target.attribute);
    text
}

#[cfg(all(test, feature = "xml"))]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sedml::data_model::ModelAttributeChangeBuilder;

    const MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sbml xmlns="http://www.sbml.org/sbml/level3/version2/core" level="3" version="2">
  <model id="model">
    <listOfParameters>
      <parameter id="k1" value="1.5" constant="true"/>
      <parameter id="k2" value="2.5" constant="true"/>
    </listOfParameters>
  </model>
</sbml>"#;

    #[test]
    fn test_parse_target() {
        let target =
            AttributeTarget::parse("/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k1']/@value")
                .unwrap();

        assert_eq!(target.attribute, "value");
        assert_eq!(target.steps.len(), 4);
        assert_eq!(target.steps[3].name, "parameter");
        assert_eq!(
            target.steps[3].predicates,
            vec![("id".to_string(), "k1".to_string())]
        );
    }

    #[test]
    fn test_parse_invalid_targets() {
        for target in [
            "sbml/model/@id",
            "/sbml/model",
            "/@id",
            "/sbml/model[@id='x'/@name",
            "/sbml//model/@id",
        ] {
            assert!(
                matches!(
                    AttributeTarget::parse(target),
                    Err(ModelChangeError::InvalidTarget(_))
                ),
                "{target} should be rejected"
            );
        }
    }

    #[test]
    fn test_set_existing_attribute() {
        let target = AttributeTarget::parse(
            "/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k2']/@value",
        )
        .unwrap();

        let updated = set_attribute(MODEL, &target, "3.0").unwrap();

        assert!(updated.contains(r#"<parameter id="k2" value="3.0" constant="true"/>"#));
        assert!(updated.contains(r#"<parameter id="k1" value="1.5" constant="true"/>"#));
    }

    #[test]
    fn test_add_missing_attribute() {
        let target = AttributeTarget::parse("/sbml:sbml/sbml:model/@name").unwrap();
        let updated = set_attribute(MODEL, &target, "renamed").unwrap();
        assert!(updated.contains(r#"<model id="model" name="renamed">"#));
    }

    #[test]
    fn test_target_not_found_and_ambiguous() {
        let missing = AttributeTarget::parse(
            "/sbml/model/listOfParameters/parameter[@id='k3']/@value",
        )
        .unwrap();
        assert!(matches!(
            set_attribute(MODEL, &missing, "0"),
            Err(ModelChangeError::TargetNotFound(_))
        ));

        let ambiguous =
            AttributeTarget::parse("/sbml/model/listOfParameters/parameter/@value").unwrap();
        assert!(matches!(
            set_attribute(MODEL, &ambiguous, "0"),
            Err(ModelChangeError::AmbiguousTarget { count: 2, .. })
        ));
    }

    #[test]
    fn test_apply_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("model.xml");
        let dest = dir.path().join("modified.xml");
        std::fs::write(&source, MODEL).unwrap();

        let changes: Vec<ModelChange> = vec![
            ModelAttributeChangeBuilder::default()
                .target("/sbml:sbml/sbml:model/sbml:listOfParameters/sbml:parameter[@id='k1']/@value")
                .new_value("10")
                .build()
                .unwrap()
                .into(),
            ModelAttributeChangeBuilder::default()
                .target("/sbml:sbml/sbml:model/@id")
                .new_value("changed")
                .build()
                .unwrap()
                .into(),
        ];

        XmlModelChangeApplier.apply(&changes, &source, &dest).unwrap();

        let written = std::fs::read_to_string(&dest).unwrap();
        assert!(written.contains(r#"<parameter id="k1" value="10" constant="true"/>"#));
        assert!(written.contains(r#"<model id="changed">"#));
        assert_eq!(std::fs::read_to_string(&source).unwrap(), MODEL);
    }
}
