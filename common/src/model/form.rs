//! Declarative description of the back-check form.
//!
//! Clients render the form from this description, and the backend takes its
//! required-field policy from it, so variants (extra fields, translations,
//! photo support) are expressed by changing the field list instead of
//! duplicating the whole flow.

use crate::model::species::Species;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    English,
    Amharic,
}

impl Locale {
    /// Accepts `en`/`am` as well as the full names.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Locale::English),
            "am" | "amharic" => Some(Locale::Amharic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Phone,
    Choice(Vec<String>),
    Integer,
    Decimal,
    LongText,
    Photo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub kind: FieldKind,
    pub label: String,
    pub localized_label: Option<String>,
    pub required: bool,
    /// Species section the field belongs to, if any.
    pub species: Option<Species>,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        FieldSpec {
            key: key.into(),
            kind,
            label: label.into(),
            localized_label: None,
            required: false,
            species: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn localized(mut self, label: impl Into<String>) -> Self {
        self.localized_label = Some(label.into());
        self
    }

    pub fn in_section(mut self, species: Species) -> Self {
        self.species = Some(species);
        self
    }

    pub fn label_for(&self, locale: Locale) -> &str {
        match locale {
            Locale::English => &self.label,
            Locale::Amharic => self.localized_label.as_deref().unwrap_or(&self.label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Default)]
pub struct FormSchemaBuilder {
    title: String,
    fields: Vec<FieldSpec>,
}

impl FormSchemaBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Appends a field; a later field with the same key replaces the earlier one in place.
    pub fn field(mut self, field: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.key == field.key) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Adds the beds / length / width triple for a species.
    pub fn species_section(self, species: Species) -> Self {
        let name = species.label();
        let local = species.amharic_label();
        let key = species.key();
        self.field(
            FieldSpec::new(format!("{key}_beds"), FieldKind::Integer, format!("{name} beds number"))
                .localized(format!("የ{local} መደብ ብዛት"))
                .in_section(species),
        )
        .field(
            FieldSpec::new(
                format!("{key}_length"),
                FieldKind::Decimal,
                format!("Length of {name} beds (m)"),
            )
            .localized(format!("የ{local} መደብ ርዝመት (ሜ)"))
            .in_section(species),
        )
        .field(
            FieldSpec::new(
                format!("{key}_sockets"),
                FieldKind::Integer,
                format!("Sockets in width (expect {})", species.expected_width()),
            )
            .localized(format!("በስፋት ያሉ ሶኬቶች (የሚጠበቀው {})", species.expected_width()))
            .in_section(species),
        )
    }

    pub fn build(self) -> FormSchema {
        FormSchema {
            title: self.title,
            fields: self.fields,
        }
    }
}

impl FormSchema {
    pub fn builder() -> FormSchemaBuilder {
        FormSchemaBuilder::default()
    }

    /// The canonical nursery back-check form.
    pub fn back_check() -> Self {
        let mut builder = FormSchema::builder()
            .title("OAF Nursery Back Check Form")
            .field(
                FieldSpec::new("woreda", FieldKind::Text, "Woreda")
                    .localized("ወረዳ")
                    .required(),
            )
            .field(FieldSpec::new("kebele", FieldKind::Text, "Kebele").localized("ቀበሌ"))
            .field(
                FieldSpec::new("accounting_code", FieldKind::Text, "Accounting code")
                    .localized("የሂሳብ ኮድ"),
            )
            .field(
                FieldSpec::new(
                    "fenced",
                    FieldKind::Choice(vec!["Yes".to_string(), "No".to_string()]),
                    "Nursery Fenced?",
                )
                .localized("የችግኝ ጣቢያው ታጥሯል?"),
            )
            .field(
                FieldSpec::new(
                    "checker_fa_name",
                    FieldKind::Text,
                    "Name of Back checker (FAs)",
                )
                .localized("የድጋሚ ተቆጣጣሪ ስም (FA)")
                .required(),
            )
            .field(
                FieldSpec::new("checker_cbe_name", FieldKind::Text, "Back checker (CBE)")
                    .localized("ድጋሚ ተቆጣጣሪ (CBE)"),
            )
            .field(
                FieldSpec::new("checker_phone", FieldKind::Phone, "Back checker phone #")
                    .localized("የተቆጣጣሪ ስልክ ቁጥር"),
            );

        for species in Species::ALL {
            builder = builder.species_section(species);
        }

        builder
            .field(
                FieldSpec::new("general_remark", FieldKind::LongText, "General remark")
                    .localized("አጠቃላይ አስተያየት"),
            )
            .field(
                FieldSpec::new("photo", FieldKind::Photo, "Nursery photo")
                    .localized("የችግኝ ጣቢያ ፎቶ"),
            )
            .build()
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key.as_str())
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Copy of the schema with every label resolved for `locale`.
    pub fn localized(&self, locale: Locale) -> FormSchema {
        FormSchema {
            title: self.title.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldSpec {
                    label: f.label_for(locale).to_string(),
                    ..f.clone()
                })
                .collect(),
        }
    }
}
