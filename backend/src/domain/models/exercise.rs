use serde::{Deserialize, Serialize};

/// Largest accepted exercise image, 5 MiB
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub group_id: Option<String>,
    pub muscles: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub description: String,
    pub group_id: Option<String>,
    pub muscles: Vec<String>,
    pub image_url: Option<String>,
}

impl ExerciseDraft {
    pub fn from_exercise(exercise: &Exercise) -> Self {
        Self {
            name: exercise.name.clone(),
            description: exercise.description.clone(),
            group_id: exercise.group_id.clone(),
            muscles: exercise.muscles.clone(),
            image_url: exercise.image_url.clone(),
        }
    }

    /// Add a muscle tag; blanks and duplicates (ignoring case) are dropped.
    /// Returns whether the list changed.
    pub fn add_muscle(&mut self, muscle: &str) -> bool {
        let muscle = muscle.trim();
        if muscle.is_empty()
            || self
                .muscles
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(muscle))
        {
            return false;
        }
        self.muscles.push(muscle.to_string());
        true
    }

    pub fn remove_muscle(&mut self, muscle: &str) {
        self.muscles.retain(|existing| existing != muscle);
    }
}

/// An image picked by the user for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
