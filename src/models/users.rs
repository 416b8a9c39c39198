use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ClientError;

/// User fields as requests and profiles embed them. Everything optional:
/// the review queue must render rows even when the backend omits pieces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserAccount {
    /// "First Last", falling back to the email, then "N/A".
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        self.email.clone().unwrap_or_else(|| "N/A".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One class/subject assignment on a teacher's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSubject {
    pub id: u64,
    #[serde(default)]
    pub class_taught: Option<SchoolClass>,
    #[serde(default)]
    pub subject: Option<Subject>,
}

impl ClassSubject {
    /// "Name (grade)" when a grade level is present.
    pub fn class_label(&self) -> Option<String> {
        let class = self.class_taught.as_ref()?;
        Some(match class.grade_level.as_deref() {
            Some(grade) if !grade.is_empty() => format!("{} ({})", class.name, grade),
            _ => class.name.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherProfile {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub user: Option<UserAccount>,
    #[serde(default)]
    pub class_subjects: Vec<ClassSubject>,
}

impl TeacherProfile {
    /// Unique class labels joined for display, "N/A" when nothing renders.
    pub fn class_list(&self) -> String {
        let mut seen = Vec::new();
        for cs in &self.class_subjects {
            if let Some(label) = cs.class_label() {
                if !seen.contains(&label) {
                    seen.push(label);
                }
            }
        }
        if seen.is_empty() {
            "N/A".to_string()
        } else {
            seen.join(", ")
        }
    }
}

/// A class/subject pair chosen during signup. Serialized camelCase because
/// that is the shape the signup endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSubjectSelection {
    #[serde(rename = "classId")]
    pub class_id: u64,
    #[serde(rename = "subjectId")]
    pub subject_id: u64,
}

/// Signup form. Validated locally before any network call goes out.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(rename = "confirmPassword")]
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
    #[serde(rename = "firstName")]
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[serde(rename = "lastName")]
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    pub bio: String,
    #[serde(rename = "classSubjects")]
    pub class_subjects: Vec<ClassSubjectSelection>,
}

impl SignupForm {
    /// Field validation plus the teacher-specific rule that at least one
    /// class/subject pair must be listed. Duplicate pairs are rejected the
    /// same way the form UI did.
    pub fn validate_for_submit(&self) -> Result<(), ClientError> {
        self.validate()?;
        if self.class_subjects.is_empty() {
            return Err(ClientError::Validation(
                "add at least one class and subject you teach".to_string(),
            ));
        }
        for (i, cs) in self.class_subjects.iter().enumerate() {
            if self.class_subjects[..i].contains(cs) {
                return Err(ClientError::Validation(
                    "this class-subject combination already exists".to_string(),
                ));
            }
        }
        Ok(())
    }
}
