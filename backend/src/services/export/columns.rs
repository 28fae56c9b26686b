//! Column order and header names of the exported table.

use chrono::SecondsFormat;
use common::model::back_check::BackCheckRecord;
use common::model::species::Species;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    Woreda,
    Kebele,
    AccountingCode,
    CheckerFaName,
    CheckerCbeName,
    CheckerPhone,
    Fenced,
    Beds(Species),
    Length(Species),
    Sockets(Species),
    TotalSockets(Species),
    AutoRemark,
    GeneralRemark,
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportColumn {
    pub key: &'static str,
    pub source: ColumnSource,
}

const fn col(key: &'static str, source: ColumnSource) -> ExportColumn {
    ExportColumn { key, source }
}

use ColumnSource::*;
use Species::{Gesho, Grevillea, Guava, Lemon};

/// Fixed export layout. Species groups follow [`Species::ALL`].
pub const EXPORT_COLUMNS: [ExportColumn; 26] = [
    col("woreda", Woreda),
    col("kebele", Kebele),
    col("accounting_code", AccountingCode),
    col("checker_fa_name", CheckerFaName),
    col("checker_cbe_name", CheckerCbeName),
    col("checker_phone", CheckerPhone),
    col("fenced", Fenced),
    col("guava_beds", Beds(Guava)),
    col("guava_length", Length(Guava)),
    col("guava_sockets", Sockets(Guava)),
    col("total_guava_sockets", TotalSockets(Guava)),
    col("gesho_beds", Beds(Gesho)),
    col("gesho_length", Length(Gesho)),
    col("gesho_sockets", Sockets(Gesho)),
    col("total_gesho_sockets", TotalSockets(Gesho)),
    col("lemon_beds", Beds(Lemon)),
    col("lemon_length", Length(Lemon)),
    col("lemon_sockets", Sockets(Lemon)),
    col("total_lemon_sockets", TotalSockets(Lemon)),
    col("grevillea_beds", Beds(Grevillea)),
    col("grevillea_length", Length(Grevillea)),
    col("grevillea_sockets", Sockets(Grevillea)),
    col("total_grevillea_sockets", TotalSockets(Grevillea)),
    col("auto_remark", AutoRemark),
    col("general_remark", GeneralRemark),
    col("timestamp", Timestamp),
];

/// `total_guava_sockets` -> `Total Guava Sockets`.
pub fn header_for(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn headers() -> Vec<String> {
    EXPORT_COLUMNS.iter().map(|c| header_for(c.key)).collect()
}

impl ColumnSource {
    /// Cell text for a record; absent values render as an empty cell.
    pub fn render(self, record: &BackCheckRecord) -> String {
        let meta = &record.metadata;
        match self {
            Woreda => meta.woreda.clone(),
            Kebele => meta.kebele.clone(),
            AccountingCode => meta.accounting_code.clone().unwrap_or_default(),
            CheckerFaName => meta.checker_fa_name.clone(),
            CheckerCbeName => meta.checker_cbe_name.clone(),
            CheckerPhone => meta.checker_phone.clone(),
            Fenced => meta.fenced.map(|f| f.to_string()).unwrap_or_default(),
            Beds(species) => record.result(species).bed_count.to_string(),
            Length(species) => record.result(species).bed_length_meters.to_string(),
            Sockets(species) => record.result(species).sockets_across_width.to_string(),
            TotalSockets(species) => record.result(species).total_sockets.to_string(),
            AutoRemark => record.auto_remark.clone().unwrap_or_default(),
            GeneralRemark => record.general_remark.clone().unwrap_or_default(),
            Timestamp => record
                .created_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
        }
    }
}

pub fn row(record: &BackCheckRecord) -> Vec<String> {
    EXPORT_COLUMNS.iter().map(|c| c.source.render(record)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_title_cased() {
        assert_eq!(header_for("total_guava_sockets"), "Total Guava Sockets");
        assert_eq!(header_for("checker_fa_name"), "Checker Fa Name");
        assert_eq!(header_for("woreda"), "Woreda");
    }

    #[test]
    fn species_groups_follow_fixed_order() {
        let species: Vec<Species> = EXPORT_COLUMNS
            .iter()
            .filter_map(|c| match c.source {
                Beds(s) | Length(s) | Sockets(s) | TotalSockets(s) => Some(s),
                _ => None,
            })
            .collect();
        let mut groups = species.clone();
        groups.dedup();
        assert_eq!(groups, Species::ALL.to_vec());
        assert!(species.chunks(4).all(|g| g.iter().all(|s| *s == g[0])));
    }

    #[test]
    fn keys_match_their_species() {
        for column in EXPORT_COLUMNS {
            if let Beds(s) | Length(s) | Sockets(s) | TotalSockets(s) = column.source {
                assert!(column.key.contains(s.key()), "{} vs {:?}", column.key, s);
            }
        }
    }
}
