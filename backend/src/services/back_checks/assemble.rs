//! Turns a form submission into a record ready for insertion.
//!
//! Assembly is all-or-nothing: either a complete [`NewBackCheck`] comes out,
//! or a single error is returned and nothing is written. Socket totals and the
//! aggregate remark are always derived here from the raw readings.

use crate::context::RequestContext;
use crate::error::BackCheckError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::metrics::aggregate_remark;
use common::model::back_check::{BackCheckMetadata, NewBackCheck, SpeciesReading, SpeciesResult};
use common::model::form::FormSchema;
use common::model::species::Species;
use common::requests::{PreviewResponse, SpeciesPreview, SubmitBackCheckRequest};

/// Raw photo bytes as received, plus the size limit they must respect.
pub struct PhotoUpload<'a> {
    pub bytes: &'a [u8],
    pub max_bytes: usize,
}

/// Places readings into the fixed species order; absent species are unmeasured.
pub fn order_readings(readings: &[SpeciesReading]) -> Result<[SpeciesReading; 4], BackCheckError> {
    let mut slots: [Option<SpeciesReading>; 4] = [None; 4];

    for reading in readings {
        if !reading.bed_length_meters.is_finite() || reading.bed_length_meters < 0.0 {
            return Err(BackCheckError::InvalidReading(format!(
                "{} bed length must be a non-negative number",
                reading.species
            )));
        }
        let slot = &mut slots[reading.species.index()];
        if slot.is_some() {
            return Err(BackCheckError::InvalidReading(format!(
                "{} was measured more than once",
                reading.species
            )));
        }
        *slot = Some(*reading);
    }

    Ok(Species::ALL.map(|species| {
        slots[species.index()].unwrap_or_else(|| SpeciesReading::unmeasured(species))
    }))
}

/// Totals and fragments for a set of readings, without touching the store.
pub fn preview(readings: &[SpeciesReading]) -> Result<PreviewResponse, BackCheckError> {
    let ordered = order_readings(readings)?;
    let species: Vec<SpeciesPreview> = ordered
        .iter()
        .map(|reading| {
            let metrics = reading.metrics();
            SpeciesPreview {
                species: reading.species,
                expected_width: reading.species.expected_width(),
                total_sockets: metrics.total_sockets,
                fragment: metrics.fragment,
            }
        })
        .collect();
    let auto_remark = aggregate_remark(
        species
            .iter()
            .map(|s| s.fragment.as_deref().unwrap_or_default()),
    );
    Ok(PreviewResponse {
        species,
        auto_remark,
    })
}

fn missing_required(schema: &FormSchema, metadata: &BackCheckMetadata) -> Vec<String> {
    schema
        .required_keys()
        .filter(|key| {
            metadata
                .field(key)
                .map(|value| value.trim().is_empty())
                .unwrap_or(false)
        })
        .map(str::to_string)
        .collect()
}

fn normalize(metadata: BackCheckMetadata) -> BackCheckMetadata {
    BackCheckMetadata {
        woreda: metadata.woreda.trim().to_string(),
        kebele: metadata.kebele.trim().to_string(),
        accounting_code: metadata
            .accounting_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty()),
        checker_fa_name: metadata.checker_fa_name.trim().to_string(),
        checker_cbe_name: metadata.checker_cbe_name.trim().to_string(),
        checker_phone: metadata.checker_phone.trim().to_string(),
        fenced: metadata.fenced,
    }
}

/// Checks that the bytes are a readable image and encodes them as base64.
///
/// An empty buffer means no photo was taken.
pub fn encode_photo(upload: Option<PhotoUpload<'_>>) -> Result<Option<String>, BackCheckError> {
    let Some(upload) = upload.filter(|u| !u.bytes.is_empty()) else {
        return Ok(None);
    };

    if upload.bytes.len() > upload.max_bytes {
        return Err(BackCheckError::Encoding(format!(
            "photo is {} bytes, the limit is {}",
            upload.bytes.len(),
            upload.max_bytes
        )));
    }

    image::load_from_memory(upload.bytes).map_err(|e| BackCheckError::Encoding(e.to_string()))?;

    Ok(Some(BASE64.encode(upload.bytes)))
}

/// Validates a submission and builds the record to store.
pub fn assemble(
    ctx: &RequestContext,
    schema: &FormSchema,
    request: SubmitBackCheckRequest,
    photo: Option<PhotoUpload<'_>>,
) -> Result<NewBackCheck, BackCheckError> {
    let missing = missing_required(schema, &request.metadata);
    if !missing.is_empty() {
        return Err(BackCheckError::Validation { missing });
    }

    let ordered = order_readings(&request.readings)?;
    let species = ordered.map(|reading| SpeciesResult::from_reading(&reading));
    let auto_remark = aggregate_remark(
        ordered
            .iter()
            .map(|reading| reading.metrics().fragment.unwrap_or_default()),
    );

    let photo = encode_photo(photo)?;

    Ok(NewBackCheck {
        metadata: normalize(request.metadata),
        species,
        auto_remark,
        general_remark: request.general_remark.trim().to_string(),
        photo,
        created_at: ctx.received_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn ctx() -> RequestContext {
        RequestContext::at(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap())
    }

    fn reading(species: Species, bed_count: u32, sockets_across_width: u32) -> SpeciesReading {
        SpeciesReading {
            species,
            bed_count,
            bed_length_meters: 8.0,
            sockets_across_width,
        }
    }

    fn request(readings: Vec<SpeciesReading>) -> SubmitBackCheckRequest {
        SubmitBackCheckRequest {
            metadata: BackCheckMetadata {
                woreda: " Jimma ".to_string(),
                checker_fa_name: "Abebe".to_string(),
                accounting_code: Some("   ".to_string()),
                ..BackCheckMetadata::default()
            },
            readings,
            general_remark: "ok".to_string(),
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 200, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn aggregate_remark_follows_species_order() {
        let req = request(vec![
            reading(Species::Grevillea, 3, 16),
            reading(Species::Gesho, 2, 17),
        ]);
        let record = assemble(&ctx(), &FormSchema::back_check(), req, None).unwrap();
        assert_eq!(record.auto_remark, "Gesho: +1 | Grevillea: Correct");
        let order: Vec<Species> = record.species.iter().map(|r| r.species).collect();
        assert_eq!(order, Species::ALL.to_vec());
    }

    #[test]
    fn nothing_measured_gives_empty_remark() {
        let record = assemble(&ctx(), &FormSchema::back_check(), request(vec![]), None).unwrap();
        assert_eq!(record.auto_remark, "");
        assert!(record.species.iter().all(|r| r.total_sockets == 0));
    }

    #[test]
    fn totals_are_recomputed() {
        let req = request(vec![reading(Species::Lemon, 7, 11)]);
        let record = assemble(&ctx(), &FormSchema::back_check(), req, None).unwrap();
        assert_eq!(record.species[Species::Lemon.index()].total_sockets, 77);
        assert_eq!(record.auto_remark, "Lemon: -2");
    }

    #[test]
    fn missing_required_fields_are_named() {
        let mut req = request(vec![reading(Species::Guava, 1, 13)]);
        req.metadata.woreda = "  ".to_string();
        req.metadata.checker_fa_name = String::new();
        let err = assemble(&ctx(), &FormSchema::back_check(), req, None).unwrap_err();
        match err {
            BackCheckError::Validation { missing } => {
                assert_eq!(missing, vec!["woreda", "checker_fa_name"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn metadata_is_trimmed_and_blank_code_dropped() {
        let record = assemble(&ctx(), &FormSchema::back_check(), request(vec![]), None).unwrap();
        assert_eq!(record.metadata.woreda, "Jimma");
        assert_eq!(record.metadata.accounting_code, None);
        assert_eq!(record.created_at, ctx().received_at);
    }

    #[test]
    fn duplicate_species_is_rejected() {
        let req = request(vec![
            reading(Species::Guava, 1, 13),
            reading(Species::Guava, 2, 13),
        ]);
        let err = assemble(&ctx(), &FormSchema::back_check(), req, None).unwrap_err();
        assert!(matches!(err, BackCheckError::InvalidReading(_)));
    }

    #[test]
    fn negative_length_is_rejected() {
        let mut bad = reading(Species::Gesho, 1, 16);
        bad.bed_length_meters = -1.0;
        assert!(order_readings(&[bad]).is_err());
    }

    #[test]
    fn assembling_twice_is_identical() {
        let readings = vec![
            reading(Species::Guava, 4, 15),
            reading(Species::Lemon, 2, 13),
        ];
        let a = assemble(&ctx(), &FormSchema::back_check(), request(readings.clone()), None).unwrap();
        let b = assemble(&ctx(), &FormSchema::back_check(), request(readings), None).unwrap();
        assert_eq!(a.species, b.species);
        assert_eq!(a.auto_remark, b.auto_remark);
    }

    #[test]
    fn photo_is_base64_encoded() {
        let bytes = png_bytes();
        let upload = PhotoUpload {
            bytes: &bytes,
            max_bytes: 1024 * 1024,
        };
        let record =
            assemble(&ctx(), &FormSchema::back_check(), request(vec![]), Some(upload)).unwrap();
        let decoded = BASE64.decode(record.photo.unwrap()).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn unreadable_photo_aborts_assembly() {
        let upload = PhotoUpload {
            bytes: b"definitely not an image",
            max_bytes: 1024,
        };
        let err = assemble(&ctx(), &FormSchema::back_check(), request(vec![]), Some(upload))
            .unwrap_err();
        assert!(matches!(err, BackCheckError::Encoding(_)));
    }

    #[test]
    fn oversized_photo_is_rejected() {
        let bytes = png_bytes();
        let upload = PhotoUpload {
            bytes: &bytes,
            max_bytes: 4,
        };
        assert!(matches!(
            encode_photo(Some(upload)),
            Err(BackCheckError::Encoding(_))
        ));
    }

    #[test]
    fn empty_photo_means_no_photo() {
        let upload = PhotoUpload {
            bytes: &[],
            max_bytes: 10,
        };
        assert_eq!(encode_photo(Some(upload)).unwrap(), None);
        assert_eq!(encode_photo(None).unwrap(), None);
    }

    #[test]
    fn preview_reports_every_species() {
        let preview = preview(&[reading(Species::Gesho, 10, 14)]).unwrap();
        assert_eq!(preview.species.len(), 4);
        assert_eq!(preview.species[1].total_sockets, 140);
        assert_eq!(preview.species[1].fragment.as_deref(), Some("Gesho: -2"));
        assert_eq!(preview.auto_remark, "Gesho: -2");
    }
}
