//! Typed view over the standard document metadata property sets.

use std::io::{Read, Seek};

use crate::consts::*;
use crate::file::CompoundFile;
use crate::property::{codepage_from_value, PropertySet, PropertyValue};

/// Standard properties from the SummaryInformation and
/// DocumentSummaryInformation streams, where present.
#[derive(Debug, Default)]
pub struct Metadata {
    // SummaryInformation
    pub codepage: Option<u32>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
    pub template: Option<String>,
    pub last_saved_by: Option<String>,
    pub revision_number: Option<String>,
    /// Total editing time in seconds
    pub edit_time: Option<u64>,
    /// Creation time, seconds since the Unix epoch
    pub create_time: Option<i64>,
    /// Last save time, seconds since the Unix epoch
    pub last_saved_time: Option<i64>,
    pub num_pages: Option<u32>,
    pub num_words: Option<u32>,
    pub num_chars: Option<u32>,
    pub creating_application: Option<String>,
    pub security: Option<u32>,

    // DocumentSummaryInformation
    pub category: Option<String>,
    pub manager: Option<String>,
    pub company: Option<String>,
}

impl Metadata {
    /// Collect metadata from an opened compound file.
    ///
    /// Both property streams are optional; missing ones just leave their
    /// fields unset.
    pub fn from_file<R: Read + Seek>(file: &CompoundFile<R>) -> Metadata {
        let mut metadata = Metadata::default();

        if let Some(props) = properties_by_name(file, "SummaryInformation") {
            metadata.extract_summary(props);
        }
        if let Some(props) = properties_by_name(file, "DocumentSummaryInformation") {
            metadata.extract_document_summary(props);
        }

        metadata
    }

    fn extract_summary(&mut self, props: &PropertySet) {
        self.codepage = props.get(PID_CODEPAGE).and_then(codepage_from_value);
        self.title = string_prop(props, PID_TITLE);
        self.subject = string_prop(props, PID_SUBJECT);
        self.author = string_prop(props, PID_AUTHOR);
        self.keywords = string_prop(props, PID_KEYWORDS);
        self.comments = string_prop(props, PID_COMMENTS);
        self.template = string_prop(props, PID_TEMPLATE);
        self.last_saved_by = string_prop(props, PID_LASTAUTHOR);
        self.revision_number = string_prop(props, PID_REVNUMBER);
        if let Some(PropertyValue::Duration(v)) = props.get(PID_EDITTIME) {
            self.edit_time = Some(*v);
        }
        if let Some(PropertyValue::Timestamp(v)) = props.get(PID_CREATE_DTM) {
            self.create_time = Some(*v);
        }
        if let Some(PropertyValue::Timestamp(v)) = props.get(PID_LASTSAVE_DTM) {
            self.last_saved_time = Some(*v);
        }
        self.num_pages = count_prop(props, PID_PAGECOUNT);
        self.num_words = count_prop(props, PID_WORDCOUNT);
        self.num_chars = count_prop(props, PID_CHARCOUNT);
        self.creating_application = string_prop(props, PID_APPNAME);
        self.security = count_prop(props, PID_SECURITY);
    }

    fn extract_document_summary(&mut self, props: &PropertySet) {
        self.category = string_prop(props, PID_CATEGORY);
        self.manager = string_prop(props, PID_MANAGER);
        self.company = string_prop(props, PID_COMPANY);
    }
}

/// The decoded property set of the named stream, if the stream exists
/// and carried one.
fn properties_by_name<'a, R: Read + Seek>(
    file: &'a CompoundFile<R>,
    name: &str,
) -> Option<&'a PropertySet> {
    let id = file.find_stream(name)?;
    file.entry(id)?.properties.as_ref()
}

fn string_prop(props: &PropertySet, id: u32) -> Option<String> {
    match props.get(id)? {
        PropertyValue::Lpstr(s) | PropertyValue::Lpwstr(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        _ => None,
    }
}

fn count_prop(props: &PropertySet, id: u32) -> Option<u32> {
    match props.get(id)? {
        PropertyValue::I4(v) => Some(*v as u32),
        PropertyValue::U4(v) => Some(*v),
        _ => None,
    }
}
