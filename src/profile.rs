//! Teacher profile: bio plus the append/remove-only class/subject relation.

use reqwest::Method;
use tracing::instrument;

use crate::auth::session::{expect_json, expect_success, SessionClient};
use crate::errors::ClientError;
use crate::models::users::{ClassSubject, TeacherProfile};

pub struct TeacherProfileClient {
    client: SessionClient,
    profile: Option<TeacherProfile>,
}

impl TeacherProfileClient {
    pub fn new(client: SessionClient) -> Self {
        Self {
            client,
            profile: None,
        }
    }

    pub fn profile(&self) -> Option<&TeacherProfile> {
        self.profile.as_ref()
    }

    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let response = self
            .client
            .send(Method::GET, "users/teachers/profile/", None)
            .await?;
        self.profile = Some(expect_json(response).await?);
        Ok(())
    }

    /// Saves a new bio and keeps the local copy in step with the server's
    /// response.
    #[instrument(skip(self, bio))]
    pub async fn update_bio(&mut self, bio: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .send(
                Method::PUT,
                "users/teachers/profile/",
                Some(&serde_json::json!({ "bio": bio })),
            )
            .await?;
        let updated: TeacherProfile = expect_json(response).await?;
        self.profile = Some(updated);
        Ok(())
    }

    /// Appends a class/subject assignment. The dependent POST is awaited
    /// before the local list changes.
    #[instrument(skip(self))]
    pub async fn add_class_subject(
        &mut self,
        class_id: u64,
        subject_id: u64,
    ) -> Result<ClassSubject, ClientError> {
        let response = self
            .client
            .send(
                Method::POST,
                "users/teachers/classes/",
                Some(&serde_json::json!({
                    "class_taught_id": class_id,
                    "subject_id": subject_id,
                })),
            )
            .await?;
        let created: ClassSubject = expect_json(response).await?;
        if let Some(profile) = &mut self.profile {
            profile.class_subjects.push(created.clone());
        }
        Ok(created)
    }

    /// Removes an assignment; the local list only changes after the DELETE
    /// succeeds.
    #[instrument(skip(self))]
    pub async fn remove_class_subject(&mut self, id: u64) -> Result<(), ClientError> {
        let response = self
            .client
            .send(
                Method::DELETE,
                &format!("users/teachers/classes/{id}/"),
                None,
            )
            .await?;
        expect_success(response).await?;
        if let Some(profile) = &mut self.profile {
            profile.class_subjects.retain(|cs| cs.id != id);
        }
        Ok(())
    }
}
