//! COMBINE Archive Data Model
//!
//! This module describes the contents of a COMBINE/OMEX archive: the files it
//! bundles, their formats, which one is the master file, and who authored what.
//! Container mechanics (zipping, manifests) live outside this crate.
//!
//! Archives compare with the same order-insensitive discipline as SED documents,
//! see [`crate::canonical`].

use std::fs::File;
use std::path::PathBuf;

use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canonical::{are_lists_equal, sorted_tuples, Canonical, Tuple};
use crate::sedml::io::IOError;

/// Format URI of SED-ML documents
pub const SEDML_FORMAT: &str = "http://identifiers.org/combine.specifications/sed-ml";

/// A COMBINE/OMEX archive
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize, JsonSchema)]
pub struct CombineArchive {
    #[builder(default, setter(into, each(name = "to_contents")))]
    #[serde(default)]
    pub contents: Vec<CombineArchiveContent>,

    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[builder(default, setter(into, each(name = "to_authors")))]
    #[serde(default)]
    pub authors: Vec<CombineArchiveAuthor>,

    /// Creation timestamp, ISO 8601
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Modification timestamp, ISO 8601
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl CombineArchive {
    /// Returns the content item marked as master.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if no content is marked as master
    /// * `Ok(Some(content))` if exactly one content is marked as master
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MultipleMasters`] if more than one content is marked.
    pub fn get_master_content(&self) -> Result<Option<&CombineArchiveContent>, ArchiveError> {
        let masters: Vec<&CombineArchiveContent> =
            self.contents.iter().filter(|content| content.master).collect();

        match masters.as_slice() {
            [] => Ok(None),
            [master] => Ok(Some(master)),
            _ => Err(ArchiveError::MultipleMasters {
                locations: masters.iter().map(|c| c.location.clone()).collect(),
            }),
        }
    }

    /// Returns the contents of a format.
    pub fn contents_with_format<'a>(
        &'a self,
        format: &'a str,
    ) -> impl Iterator<Item = &'a CombineArchiveContent> + 'a {
        self.contents
            .iter()
            .filter(move |content| content.format == format)
    }
}

impl Canonical for CombineArchive {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            sorted_tuples(&self.contents),
            Tuple::from(self.description.as_deref()),
            sorted_tuples(&self.authors),
            Tuple::from(self.created.as_deref()),
            Tuple::from(self.updated.as_deref()),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        are_lists_equal(&self.contents, &other.contents)
            && self.description == other.description
            && are_lists_equal(&self.authors, &other.authors)
            && self.created == other.created
            && self.updated == other.updated
    }
}

/// A file in a COMBINE/OMEX archive
#[derive(Debug, Clone, Builder, Serialize, Deserialize, JsonSchema)]
pub struct CombineArchiveContent {
    /// Path of the file, relative to the archive root
    #[builder(setter(into))]
    pub location: String,

    /// URI of the format specification of the file
    #[builder(setter(into))]
    pub format: String,

    /// Whether the file is the primary content of the archive
    #[builder(default)]
    #[serde(default)]
    pub master: bool,

    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[builder(default, setter(into, each(name = "to_authors")))]
    #[serde(default)]
    pub authors: Vec<CombineArchiveAuthor>,

    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl Canonical for CombineArchiveContent {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.location),
            Tuple::from(&self.format),
            Tuple::from(self.master),
            Tuple::from(self.description.as_deref()),
            sorted_tuples(&self.authors),
            Tuple::from(self.created.as_deref()),
            Tuple::from(self.updated.as_deref()),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.location == other.location
            && self.format == other.format
            && self.master == other.master
            && self.description == other.description
            && are_lists_equal(&self.authors, &other.authors)
            && self.created == other.created
            && self.updated == other.updated
    }
}

/// An author of an archive or of one of its files
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize, JsonSchema)]
pub struct CombineArchiveAuthor {
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

impl Canonical for CombineArchiveAuthor {
    /// Authors sort by family name first.
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(self.family_name.as_deref()),
            Tuple::from(self.given_name.as_deref()),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self == other
    }
}

/// Loads an archive description from a JSON file.
pub fn load_combine_archive(path: impl Into<PathBuf>) -> Result<CombineArchive, IOError> {
    let path = path.into();
    let file = File::open(&path).map_err(|source| IOError::FileNotFound {
        path: path.clone(),
        source,
    })?;
    serde_json::from_reader(file).map_err(|source| IOError::JsonParseError { path, source })
}

/// Saves an archive description to a JSON file.
pub fn save_combine_archive(
    path: impl Into<PathBuf>,
    archive: &CombineArchive,
) -> Result<(), IOError> {
    let path = path.into();
    let file = File::create(&path).map_err(|source| IOError::FileNotFound {
        path: path.clone(),
        source,
    })?;
    serde_json::to_writer_pretty(file, archive)
        .map_err(|source| IOError::JsonParseError { path, source })
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Multiple content items are marked as master: {}", locations.join(", "))]
    MultipleMasters { locations: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(given: &str, family: &str) -> CombineArchiveAuthor {
        CombineArchiveAuthorBuilder::default()
            .given_name(given)
            .family_name(family)
            .build()
            .unwrap()
    }

    fn content(location: &str, master: bool) -> CombineArchiveContent {
        CombineArchiveContentBuilder::default()
            .location(location)
            .format(SEDML_FORMAT)
            .master(master)
            .to_authors(author("Jane", "Doe"))
            .created("2020-12-29T00:00:00Z")
            .build()
            .unwrap()
    }

    fn archive(contents: Vec<CombineArchiveContent>) -> CombineArchive {
        CombineArchiveBuilder::default()
            .contents(contents)
            .description("An archive")
            .authors(vec![author("Jane", "Doe"), author("John", "Roe")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_master_content() {
        let none = archive(vec![content("a.sedml", false), content("b.sedml", false)]);
        assert!(none.get_master_content().unwrap().is_none());

        let one = archive(vec![content("a.sedml", false), content("b.sedml", true)]);
        assert_eq!(one.get_master_content().unwrap().unwrap().location, "b.sedml");

        let two = archive(vec![content("a.sedml", true), content("b.sedml", true)]);
        let err = two.get_master_content().unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::MultipleMasters { ref locations } if locations == &["a.sedml", "b.sedml"]
        ));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = archive(vec![content("a.sedml", true), content("b.sedml", false)]);
        let mut b = archive(vec![content("b.sedml", false), content("a.sedml", true)]);
        b.authors.reverse();

        assert!(a.is_equal(&a));
        assert!(a.is_equal(&b));
        assert_eq!(a.to_tuple(), b.to_tuple());
    }

    #[test]
    fn test_single_field_difference() {
        let a = archive(vec![content("a.sedml", true)]);

        let mut b = a.clone();
        b.contents[0].master = false;
        assert!(!a.is_equal(&b));
        assert_ne!(a.to_tuple(), b.to_tuple());

        let mut c = a.clone();
        c.updated = Some("2021-01-01T00:00:00Z".to_string());
        assert!(!a.is_equal(&c));
        assert_ne!(a.to_tuple(), c.to_tuple());

        assert!(!author("Jane", "Doe").is_equal(&author("Jane", "Roe")));
    }

    #[test]
    fn test_author_tuple_sorts_by_family_name() {
        assert_eq!(
            author("Zoe", "Adams").to_tuple(),
            Tuple::seq([Tuple::from("Adams"), Tuple::from("Zoe")])
        );
        assert!(author("Zoe", "Adams").to_tuple() < author("Al", "Brown").to_tuple());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");
        let original = archive(vec![content("a.sedml", true)]);

        save_combine_archive(&path, &original).unwrap();
        let loaded = load_combine_archive(&path).unwrap();

        assert!(original.is_equal(&loaded));
    }
}
