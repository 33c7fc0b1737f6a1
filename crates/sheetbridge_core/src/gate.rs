use std::fmt;

use crate::state::{FileRef, InputState, Operation};

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A media-type/extension pair the picker and the gate both accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedType {
    pub media_type: &'static str,
    pub extension: &'static str,
}

pub const SPREADSHEET_UPLOADS: &[AcceptedType] = &[
    AcceptedType {
        media_type: "application/vnd.ms-excel",
        extension: "xls",
    },
    AcceptedType {
        media_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        extension: "xlsx",
    },
    AcceptedType {
        media_type: "application/vnd.ms-excel.sheet.macroEnabled.12",
        extension: "xlsm",
    },
];

pub const JSON_UPLOADS: &[AcceptedType] = &[AcceptedType {
    media_type: "application/json",
    extension: "json",
}];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub accepted: &'static [AcceptedType],
    pub max_bytes: u64,
}

impl UploadPolicy {
    pub fn spreadsheet() -> Self {
        Self {
            accepted: SPREADSHEET_UPLOADS,
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn json() -> Self {
        Self {
            accepted: JSON_UPLOADS,
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    fn allows(&self, file: &FileRef) -> bool {
        let media_type_ok = file.media_type.as_deref().is_some_and(|declared| {
            let declared = declared.split(';').next().unwrap_or(declared).trim();
            self.accepted
                .iter()
                .any(|accepted| accepted.media_type.eq_ignore_ascii_case(declared))
        });
        let extension_ok = file.extension().is_some_and(|ext| {
            self.accepted
                .iter()
                .any(|accepted| accepted.extension.eq_ignore_ascii_case(ext))
        });
        media_type_ok || extension_ok
    }
}

/// Why the current input cannot be submitted. The first violation wins;
/// violations are never aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRejection {
    NoFileSelected { operation: Operation },
    TooManyFiles { count: usize },
    UnsupportedFileType { name: String },
    FileTooLarge { max_bytes: u64, actual: u64 },
    EmptyText,
    /// No editor syntax report has arrived yet; the gate fails closed.
    AwaitingValidation,
    /// The editor reported the text as malformed.
    InvalidText { message: String },
}

impl InputRejection {
    /// Malformed-text rejections, as opposed to missing or unacceptable
    /// input.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            InputRejection::AwaitingValidation | InputRejection::InvalidText { .. }
        )
    }
}

impl fmt::Display for InputRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRejection::NoFileSelected { operation } => match operation {
                Operation::SpreadsheetToJson => write!(f, "Please select a file to convert"),
                Operation::JsonToSpreadsheet => {
                    write!(f, "Please select a JSON file to convert")
                }
                Operation::SchemaGeneration => write!(f, "Please select an Excel file"),
            },
            InputRejection::TooManyFiles { count } => {
                write!(f, "Please select a single file ({count} selected)")
            }
            InputRejection::UnsupportedFileType { name } => {
                write!(f, "File type of {name} is not supported here")
            }
            InputRejection::FileTooLarge { max_bytes, actual } => {
                let limit_mib = max_bytes / (1024 * 1024);
                write!(
                    f,
                    "File is larger than the {limit_mib} MiB limit ({actual} bytes)"
                )
            }
            InputRejection::EmptyText => {
                write!(f, "Please enter JSON data or upload a JSON file")
            }
            InputRejection::AwaitingValidation => write!(f, "Waiting for JSON validation"),
            InputRejection::InvalidText { message } => write!(f, "{message}"),
        }
    }
}

/// Decide whether the given input may be submitted under the policy.
///
/// File input is checked synchronously; text input defers to the last-known
/// editor report and fails closed while none has arrived. File input never
/// consults the editor signal.
pub fn evaluate(
    operation: Operation,
    input: &InputState,
    policy: &UploadPolicy,
) -> Result<(), InputRejection> {
    match input {
        InputState::File { files } => {
            let file = match files.as_slice() {
                [] => return Err(InputRejection::NoFileSelected { operation }),
                [file] => file,
                files => {
                    return Err(InputRejection::TooManyFiles { count: files.len() });
                }
            };
            if !policy.allows(file) {
                return Err(InputRejection::UnsupportedFileType {
                    name: file.name.clone(),
                });
            }
            if file.size() > policy.max_bytes {
                return Err(InputRejection::FileTooLarge {
                    max_bytes: policy.max_bytes,
                    actual: file.size(),
                });
            }
            Ok(())
        }
        InputState::Text { content, editor } => {
            if content.trim().is_empty() {
                return Err(InputRejection::EmptyText);
            }
            match editor {
                None => Err(InputRejection::AwaitingValidation),
                Some(report) if !report.is_valid => Err(InputRejection::InvalidText {
                    message: report
                        .first_error
                        .clone()
                        .unwrap_or_else(|| "Invalid JSON input".to_string()),
                }),
                Some(_) => Ok(()),
            }
        }
    }
}

pub fn is_submittable(operation: Operation, input: &InputState, policy: &UploadPolicy) -> bool {
    evaluate(operation, input, policy).is_ok()
}
