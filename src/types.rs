//! Core types: report fields, submissions, attachments and dispatch results

use crate::config::UploadConfig;
use crate::error::SubmissionError;
use crate::utils::{file_extension, secure_filename, truncate_utf16};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Telegram limit for photo/document captions, in UTF-16 code units
pub const CAPTION_MAX_CHARS: usize = 1024;

/// Telegram limit for message text, in UTF-16 code units
pub const MESSAGE_MAX_CHARS: usize = 4096;

/// Fields of a shift report as posted by the form.
///
/// Every field is optional; missing fields render as blanks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportFields {
    /// Report date
    pub date: String,
    /// Report time (the form also posts this as `Time`)
    pub time: String,
    /// Shift name
    pub shift: String,
    /// Name of the person submitting
    pub name: String,
    /// Number of glasses sold
    pub total_glasses: String,
    /// Total takings
    pub total_money: String,
    /// ABA transfers in USD
    pub aba_usd: String,
    /// ABA transfers in riel
    pub aba_khr: String,
    /// ACLEDA transfers in USD
    pub acleda_usd: String,
    /// ACLEDA transfers in riel
    pub acleda_khr: String,
    /// Transfers through any other bank
    pub other_bank: String,
    /// Cash in USD
    pub cash_usd: String,
    /// Cash in riel
    pub cash_khr: String,
    /// Expenses paid out of the till
    pub expense: String,
    /// Balance status (e.g. "over", "short", "balanced")
    pub balance_status: String,
    /// Balance difference
    pub balance_amount: String,
    /// Free-form notes
    pub notes: String,
}

impl ReportFields {
    /// Assign a posted form field by name.
    ///
    /// Returns `false` for names that are not part of the report.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "date" => &mut self.date,
            "time" | "Time" => &mut self.time,
            "shift" => &mut self.shift,
            "name" => &mut self.name,
            "total_glasses" => &mut self.total_glasses,
            "total_money" => &mut self.total_money,
            "aba_usd" => &mut self.aba_usd,
            "aba_khr" => &mut self.aba_khr,
            "acleda_usd" => &mut self.acleda_usd,
            "acleda_khr" => &mut self.acleda_khr,
            "other_bank" => &mut self.other_bank,
            "cash_usd" => &mut self.cash_usd,
            "cash_khr" => &mut self.cash_khr,
            "expense" => &mut self.expense,
            "balance_status" => &mut self.balance_status,
            "balance_amount" => &mut self.balance_amount,
            "notes" | "text" => &mut self.notes,
            _ => return false,
        };
        *slot = value.trim().to_string();
        true
    }

    /// Render the chat message for this report
    pub fn render(&self) -> String {
        let mut text = format!(
            "📋 New report\n\
             📅 Date: {}\n\
             ⏰ Time: {}\n\
             ⏰ Shift: {}\n\
             👤 Name: {}\n\
             🥤 Glasses: {}\n\
             💵 Total money: {}\n\n\
             🏦 ABA ($): {}\n\
             🏦 ABA (៛): {}\n\
             🏦 ACLEDA ($): {}\n\
             🏦 ACLEDA (៛): {}\n\
             🏦 Other bank: {}\n\n\
             💰 Cash ($): {}\n\
             💰 Cash (៛): {}\n\
             💸 Expense: {}\n\
             ⚖️ Balance: {} / {}",
            self.date,
            self.time,
            self.shift,
            self.name,
            self.total_glasses,
            self.total_money,
            self.aba_usd,
            self.aba_khr,
            self.acleda_usd,
            self.acleda_khr,
            self.other_bank,
            self.cash_usd,
            self.cash_khr,
            self.expense,
            self.balance_status,
            self.balance_amount,
        );
        if !self.notes.is_empty() {
            text.push_str("\n\n📝 ");
            text.push_str(&self.notes);
        }
        text
    }

    /// Caption attached to the uploaded file
    pub fn caption(&self) -> String {
        format!("Attachment from {}", self.name)
    }

    /// Turn the report into a submission ready for dispatch
    pub fn into_submission(self, attachment: Option<Attachment>) -> Submission {
        Submission::new(self.render(), self.caption(), attachment)
    }
}

/// How an attachment is relayed to the chat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Sent as a photo so the chat shows a preview
    Photo,
    /// Sent as a generic file
    Document,
}

/// A validated uploaded file
#[derive(Clone)]
pub struct Attachment {
    /// Sanitized file name
    pub file_name: String,
    /// Lowercased extension, always in the configured allow-set
    pub extension: String,
    /// MIME type guessed from the file name
    pub content_type: String,
    /// Photo or document
    pub kind: AttachmentKind,
    /// File contents
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("kind", &self.kind)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    /// Sanitize a client file name and check its extension against the
    /// allow-set, returning the safe name and its extension.
    pub fn check_type(
        client_file_name: &str,
        limits: &UploadConfig,
    ) -> Result<(String, String), SubmissionError> {
        let file_name = secure_filename(client_file_name);
        let extension = file_extension(&file_name);

        if file_name.is_empty() || !limits.is_allowed(&extension) {
            return Err(SubmissionError::FileTypeNotAllowed {
                file_name: if file_name.is_empty() {
                    client_file_name.to_string()
                } else {
                    file_name
                },
            });
        }
        Ok((file_name, extension))
    }

    /// Validate an uploaded file against the configured limits.
    ///
    /// The client file name is sanitized first; the type check runs before
    /// the size check.
    pub fn from_upload(
        client_file_name: &str,
        bytes: Vec<u8>,
        limits: &UploadConfig,
    ) -> Result<Self, SubmissionError> {
        let (file_name, extension) = Self::check_type(client_file_name, limits)?;

        let size = bytes.len() as u64;
        if size > limits.max_upload_bytes {
            return Err(SubmissionError::TooLarge {
                size,
                limit: limits.max_upload_bytes,
            });
        }

        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let kind = if limits.is_image(&extension) {
            AttachmentKind::Photo
        } else {
            AttachmentKind::Document
        };

        Ok(Self {
            file_name,
            extension,
            content_type,
            kind,
            bytes,
        })
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One user-provided report: text and an optional file.
///
/// Lives for the duration of a single request.
#[derive(Clone, Debug)]
pub struct Submission {
    /// Message text, at most [`MESSAGE_MAX_CHARS`] UTF-16 units
    pub text: String,
    /// Caption for the attachment, at most [`CAPTION_MAX_CHARS`] UTF-16 units
    pub caption: String,
    /// Optional validated attachment
    pub attachment: Option<Attachment>,
}

impl Submission {
    /// Create a submission, clamping text and caption to Telegram's limits
    pub fn new(
        text: impl Into<String>,
        caption: impl Into<String>,
        attachment: Option<Attachment>,
    ) -> Self {
        let text = text.into();
        let caption = caption.into();
        Self {
            text: truncate_utf16(&text, MESSAGE_MAX_CHARS).to_string(),
            caption: truncate_utf16(&caption, CAPTION_MAX_CHARS).to_string(),
            attachment,
        }
    }
}

/// A message the chat accepted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Delivery {
    /// Telegram message id, when the API returned one
    pub message_id: Option<i64>,
}

/// Result of relaying one submission
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DispatchReport {
    /// Outcome of the text message
    pub message: LegOutcome,
    /// Outcome of the attachment, when one was submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<LegOutcome>,
}

impl DispatchReport {
    /// True when every submitted part reached the chat
    pub fn is_complete(&self) -> bool {
        self.message.is_sent() && self.attachment.as_ref().is_none_or(LegOutcome::is_sent)
    }
}

/// Outcome of a single send operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LegOutcome {
    /// The API accepted the message
    Sent {
        /// Telegram message id
        message_id: Option<i64>,
    },
    /// The send failed
    Failed {
        /// Error description
        error: String,
    },
}

impl LegOutcome {
    /// Whether this send succeeded
    pub fn is_sent(&self) -> bool {
        matches!(self, LegOutcome::Sent { .. })
    }

    /// Error description for a failed send
    pub fn error(&self) -> Option<&str> {
        match self {
            LegOutcome::Sent { .. } => None,
            LegOutcome::Failed { error } => Some(error),
        }
    }
}
