//! Parsing and validation of submitted forms.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use url::{form_urlencoded, Url};

use crate::artist::ArtistFields;
use crate::errors::BookingError;
use crate::normalization::normalize_text;
use crate::show::{format_timestamp, parse_timestamp, NewShow};
use crate::summary::Id;
use crate::venue::VenueFields;
use crate::vocabulary::{Genre, State};

/// The longest accepted `seeking_description`, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 700;

/// The longest accepted city, address, phone number, Facebook link or
/// website, in characters.
pub const MAX_TEXT_LENGTH: usize = 120;

pub const MAX_IMAGE_LINK_LENGTH: usize = 500;

const REQUIRED: &str = "This field is required.";
const INVALID_URL: &str = "Invalid URL.";
const INVALID_CHOICE: &str = "Not a valid choice.";
const INVALID_INTEGER: &str = "Not a valid integer value.";
const INVALID_DATETIME: &str = "Not a valid datetime value.";

const CHECKED: &[&str] = &["y", "on", "true", "1"];

const VENUE_FIELDS: &[&str] = &[
    "name",
    "city",
    "state",
    "address",
    "phone",
    "image_link",
    "facebook_link",
    "website",
    "genres",
    "seeking_talent",
    "seeking_description",
];

const ARTIST_FIELDS: &[&str] = &[
    "name",
    "city",
    "state",
    "phone",
    "genres",
    "image_link",
    "facebook_link",
    "website",
    "seeking_venue",
    "seeking_description",
];

/// The fields of an `application/x-www-form-urlencoded` body. A key
/// may appear more than once. Values are kept as submitted and
/// normalized.
#[derive(Clone, Debug, Default)]
pub struct FormData {
    values: HashMap<String, Vec<FieldValue>>,
}

#[derive(Clone, Debug)]
struct FieldValue {
    submitted: String,
    normalized: String,
}

impl FormData {
    pub fn parse(body: &[u8]) -> Self {
        let mut values: HashMap<String, Vec<FieldValue>> = HashMap::new();

        for (key, value) in form_urlencoded::parse(body) {
            values.entry(key.into_owned()).or_default().push(FieldValue {
                normalized: normalize_text(&value),
                submitted: value.into_owned(),
            });
        }

        FormData { values }
    }

    /// The first non-empty value given for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Every non-empty value given for `name`, in submission order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .get(name)
            .into_iter()
            .flatten()
            .map(|v| v.normalized.as_str())
            .filter(|v| !v.is_empty())
    }

    /// The first value given for `name`, whitespace included.
    pub fn get_submitted(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)?
            .first()
            .map(|v| v.submitted.as_str())
    }
}

/// Messages describing why each field was rejected, keyed by field
/// name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }
}

/// Reads typed values out of a form, collecting every problem instead
/// of stopping at the first one.
struct Validator<'a> {
    form: &'a FormData,
    errors: ValidationErrors,
}

impl<'a> Validator<'a> {
    fn new(form: &'a FormData) -> Self {
        Validator {
            form,
            errors: ValidationErrors::default(),
        }
    }

    fn required(&mut self, field: &'static str) -> Option<String> {
        let value = self.optional(field);

        if value.is_none() {
            self.errors.add(field, REQUIRED);
        }

        value
    }

    fn optional(&self, field: &'static str) -> Option<String> {
        self.form.get(field).map(str::to_owned)
    }

    fn text(&mut self, field: &'static str, max: usize) -> Option<String> {
        let value = self.required(field)?;

        self.at_most(field, value, max)
    }

    fn optional_text(&mut self, field: &'static str, max: usize) -> Option<String> {
        let value = self.optional(field)?;

        self.at_most(field, value, max)
    }

    fn link(&mut self, field: &'static str, max: usize) -> Option<String> {
        let value = self.optional_text(field, max)?;

        if is_web_url(&value) {
            Some(value)
        } else {
            self.errors.add(field, INVALID_URL);
            None
        }
    }

    fn at_most(&mut self, field: &'static str, value: String, max: usize) -> Option<String> {
        if value.chars().count() > max {
            self.errors.add(
                field,
                format!("Field cannot be longer than {} characters.", max),
            );
            None
        } else {
            Some(value)
        }
    }

    fn state(&mut self, field: &'static str) -> Option<State> {
        match self.required(field)?.parse() {
            Ok(state) => Some(state),
            Err(_) => {
                self.errors.add(field, INVALID_CHOICE);
                None
            }
        }
    }

    fn genres(&mut self, field: &'static str) -> Vec<Genre> {
        let form = self.form;
        let mut genres: Vec<Genre> = vec![];

        for label in form.get_all(field) {
            match label.parse() {
                Ok(genre) if !genres.contains(&genre) => genres.push(genre),
                Ok(_) => {}
                Err(_) => self
                    .errors
                    .add(field, format!("'{}' is not a valid choice.", label)),
            }
        }

        if genres.is_empty() && self.errors.field(field).is_none() {
            self.errors.add(field, REQUIRED);
        }

        genres
    }

    fn checkbox(&self, field: &'static str) -> bool {
        self.form
            .get(field)
            .map(|v| CHECKED.contains(&v.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn id(&mut self, field: &'static str) -> Option<Id> {
        match self.required(field)?.parse::<Id>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.errors.add(field, INVALID_INTEGER);
                None
            }
        }
    }

    fn timestamp(&mut self, field: &'static str) -> Option<OffsetDateTime> {
        let value = self.required(field)?;
        let timestamp = parse_timestamp(&value);

        if timestamp.is_none() {
            self.errors.add(field, INVALID_DATETIME);
        }

        timestamp
    }

    /// Succeeds only when no field was rejected.
    fn finish<T>(self, value: Option<T>) -> Result<T, BookingError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(BookingError::Validation(self.errors)),
        }
    }
}

fn is_web_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

pub fn parse_venue(form: &FormData) -> Result<VenueFields, BookingError> {
    let mut v = Validator::new(form);

    let name = v.required("name");
    let city = v.text("city", MAX_TEXT_LENGTH);
    let state = v.state("state");
    let address = v.text("address", MAX_TEXT_LENGTH);
    let phone = v.optional_text("phone", MAX_TEXT_LENGTH);
    let image_link = v.link("image_link", MAX_IMAGE_LINK_LENGTH);
    let facebook_link = v.link("facebook_link", MAX_TEXT_LENGTH);
    let website = v.link("website", MAX_TEXT_LENGTH);
    let genres = v.genres("genres");
    let seeking_talent = v.checkbox("seeking_talent");
    let seeking_description = v.optional_text("seeking_description", MAX_DESCRIPTION_LENGTH);

    let fields = match (name, city, state, address) {
        (Some(name), Some(city), Some(state), Some(address)) => Some(VenueFields {
            name,
            city,
            state,
            address,
            phone,
            image_link,
            facebook_link,
            website,
            genres,
            seeking_talent,
            seeking_description,
        }),
        _ => None,
    };

    v.finish(fields)
}

pub fn parse_artist(form: &FormData) -> Result<ArtistFields, BookingError> {
    let mut v = Validator::new(form);

    let name = v.required("name");
    let city = v.text("city", MAX_TEXT_LENGTH);
    let state = v.state("state");
    let phone = v.optional_text("phone", MAX_TEXT_LENGTH);
    let genres = v.genres("genres");
    let image_link = v.link("image_link", MAX_IMAGE_LINK_LENGTH);
    let facebook_link = v.link("facebook_link", MAX_TEXT_LENGTH);
    let website = v.link("website", MAX_TEXT_LENGTH);
    let seeking_venue = v.checkbox("seeking_venue");
    let seeking_description = v.optional_text("seeking_description", MAX_DESCRIPTION_LENGTH);

    let fields = match (name, city, state) {
        (Some(name), Some(city), Some(state)) => Some(ArtistFields {
            name,
            city,
            state,
            phone,
            genres,
            image_link,
            facebook_link,
            website,
            seeking_venue,
            seeking_description,
        }),
        _ => None,
    };

    v.finish(fields)
}

pub fn parse_show(form: &FormData) -> Result<NewShow, BookingError> {
    let mut v = Validator::new(form);

    let artist_id = v.id("artist_id");
    let venue_id = v.id("venue_id");
    let start_time = v.timestamp("start_time");

    let show = match (artist_id, venue_id, start_time) {
        (Some(artist_id), Some(venue_id), Some(start_time)) => Some(NewShow {
            venue_id,
            artist_id,
            start_time,
        }),
        _ => None,
    };

    v.finish(show)
}

/// The search term of a search form, exactly as typed apart from
/// Unicode composition. A missing term searches for everything.
pub fn parse_search_term(form: &FormData) -> String {
    use unicode_normalization::UnicodeNormalization;

    form.get_submitted("search_term")
        .unwrap_or_default()
        .nfc()
        .collect()
}

/// The options offered by a form's select fields.
#[derive(Clone, Debug, Serialize)]
pub struct Choices {
    genres: &'static [Genre],
    states: &'static [State],
}

impl Default for Choices {
    fn default() -> Self {
        Choices {
            genres: Genre::ALL,
            states: State::ALL,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
enum FormValues {
    Venue(VenueFields),
    Artist(ArtistFields),
    Initial(BTreeMap<&'static str, Value>),
}

/// What a client needs to render a form: its initial values and the
/// choices of its selects.
#[derive(Clone, Debug, Serialize)]
pub struct FormDocument {
    form: FormValues,

    #[serde(skip_serializing_if = "Option::is_none")]
    choices: Option<Choices>,
}

impl FormDocument {
    pub fn blank_venue() -> Self {
        FormDocument {
            form: FormValues::Initial(blank(VENUE_FIELDS)),
            choices: Some(Choices::default()),
        }
    }

    pub fn blank_artist() -> Self {
        FormDocument {
            form: FormValues::Initial(blank(ARTIST_FIELDS)),
            choices: Some(Choices::default()),
        }
    }

    pub fn venue(fields: VenueFields) -> Self {
        FormDocument {
            form: FormValues::Venue(fields),
            choices: Some(Choices::default()),
        }
    }

    pub fn artist(fields: ArtistFields) -> Self {
        FormDocument {
            form: FormValues::Artist(fields),
            choices: Some(Choices::default()),
        }
    }

    /// A show form whose start time defaults to `now`.
    pub fn blank_show(now: OffsetDateTime) -> Self {
        let mut values = blank(&["artist_id", "venue_id"]);
        values.insert("start_time", Value::String(format_timestamp(now)));

        FormDocument {
            form: FormValues::Initial(values),
            choices: None,
        }
    }
}

fn blank(fields: &[&'static str]) -> BTreeMap<&'static str, Value> {
    fields
        .iter()
        .map(|&field| {
            let value = match field {
                "genres" => json!([]),
                "seeking_talent" | "seeking_venue" => json!(false),
                _ => Value::Null,
            };

            (field, value)
        })
        .collect()
}
