use chrono::NaiveDateTime;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Employee {
    pub fn has_photo(&self) -> bool {
        self.photo_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Photo URL relative to the API base, e.g. `/uploads/photos/E1.jpg`
    pub fn photo_url(&self, base_url: &str) -> Option<String> {
        let path = self.photo_path.as_deref().filter(|p| !p.is_empty())?;
        if path.starts_with('/') {
            Some(format!("{}{}", base_url, path))
        } else {
            Some(format!("{}/{}", base_url, path))
        }
    }
}

/// Uploaded photo attached to a new employee
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Fields for creating an employee. Sent as a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub photo: Option<Photo>,
}

impl NewEmployee {
    pub fn new(
        employee_id: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            full_name: full_name.into(),
            email: email.into(),
            department: department.into(),
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: Photo) -> Self {
        self.photo = Some(photo);
        self
    }

    /// Build the multipart body. Fails only if the photo MIME type is malformed.
    pub fn to_form(&self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new()
            .text("employee_id", self.employee_id.clone())
            .text("full_name", self.full_name.clone())
            .text("email", self.email.clone())
            .text("department", self.department.clone());

        if let Some(ref photo) = self.photo {
            let part = Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(&photo.mime_type)?;
            form = form.part("photo", part);
        }

        Ok(form)
    }
}
