//! Request validation for the upload endpoints

use std::collections::HashSet;

use crate::error::AppError;
use crate::storage::CompletedPart;

use super::keys::sanitize_file_name;
use super::types::{PartEtag, ALLOWED_MIME_TYPES, MAX_PARTS};

/// Return the trimmed value of a required field or a 400 with `message`.
pub fn require<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(message))
}

pub fn require_file_name(file_name: Option<&str>) -> Result<String, AppError> {
    let name = require(file_name, "Filename not present")?;
    sanitize_file_name(name)
        .ok_or_else(|| AppError::bad_request("Filename is not usable as an object key"))
}

pub fn require_content_type(content_type: Option<&str>) -> Result<String, AppError> {
    let content_type = require(content_type, "Content Type not present")?;
    if !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(AppError::bad_request(
            "Invalid content type. Only images and videos are allowed",
        ));
    }
    Ok(content_type.to_string())
}

pub fn require_upload_id(upload_id: Option<&str>) -> Result<String, AppError> {
    require(upload_id, "Upload id not present").map(str::to_string)
}

pub fn require_part_count(part_numbers: Option<i64>) -> Result<i32, AppError> {
    match part_numbers {
        Some(count) if (1..=MAX_PARTS).contains(&count) => Ok(count as i32),
        Some(count) => Err(AppError::bad_request(format!(
            "Part count must be between 1 and {}, got {}",
            MAX_PARTS, count
        ))),
        None => Err(AppError::bad_request("Part count not present")),
    }
}

/// Number the parts and sort them for completion.
///
/// Parts without an explicit `partNumber` are numbered by position. Either
/// every part carries a number or none does.
pub fn normalize_parts(parts: Option<&[PartEtag]>) -> Result<Vec<CompletedPart>, AppError> {
    let parts = match parts {
        Some(parts) if !parts.is_empty() => parts,
        _ => return Err(AppError::bad_request("Parts not present")),
    };

    let numbered = parts.iter().filter(|p| p.part_number.is_some()).count();
    if numbered != 0 && numbered != parts.len() {
        return Err(AppError::bad_request(
            "Either every part or no part must carry a partNumber",
        ));
    }

    let mut seen = HashSet::with_capacity(parts.len());
    let mut completed = Vec::with_capacity(parts.len());

    for (index, part) in parts.iter().enumerate() {
        let part_number = part.part_number.unwrap_or(index as i64 + 1);
        if !(1..=MAX_PARTS).contains(&part_number) {
            return Err(AppError::bad_request(format!(
                "Part number {} is out of range",
                part_number
            )));
        }
        if !seen.insert(part_number) {
            return Err(AppError::bad_request(format!(
                "Duplicate part number {}",
                part_number
            )));
        }

        let etag = require(part.etag.as_deref(), "Part etag not present")?;
        completed.push(CompletedPart {
            part_number: part_number as i32,
            etag: etag.to_string(),
        });
    }

    completed.sort_by_key(|p| p.part_number);
    Ok(completed)
}
