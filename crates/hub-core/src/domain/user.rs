use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::level::SkillLevel;

/// Public profile details of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: SkillLevel,
    pub github: String,
    pub linkedin: String,
    pub website: String,
    pub avatar: String,
}

/// Partial profile update; every field is merged independently.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<SkillLevel>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
}

impl Profile {
    /// Shallow merge: only the sub-fields present in the patch change.
    pub fn merge(&mut self, patch: ProfilePatch) {
        if let Some(bio) = patch.bio {
            self.bio = bio;
        }
        if let Some(skills) = patch.skills {
            self.skills = skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(experience) = patch.experience {
            self.experience = experience;
        }
        if let Some(github) = patch.github {
            self.github = github;
        }
        if let Some(linkedin) = patch.linkedin {
            self.linkedin = linkedin;
        }
        if let Some(website) = patch.website {
            self.website = website;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
    }
}

/// Partial update of a user's identity and profile.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile: Option<ProfilePatch>,
}

/// User entity - a registered developer.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub profile: Profile,
    pub saved_posts: Vec<Uuid>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical form of an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            profile: Profile::default(),
            saved_posts: Vec::new(),
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Uniqueness of username and email is the caller's concern.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(username) = patch.username {
            self.username = username.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(&email);
        }
        if let Some(profile) = patch.profile {
            self.profile.merge(profile);
        }
        self.updated_at = Utc::now();
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    pub fn has_saved(&self, post_id: Uuid) -> bool {
        self.saved_posts.contains(&post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = User::new(" alice ", " Alice@Example.COM ", "hash".to_string());
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.profile.experience, SkillLevel::Beginner);
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new("alice", "alice@example.com", "$argon2id$secret".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_profile_merge_is_shallow() {
        let mut user = User::new("alice", "alice@example.com", "hash".to_string());
        user.profile.bio = "Rustacean".to_string();
        user.profile.github = "https://github.com/alice".to_string();

        user.apply(UserPatch {
            profile: Some(ProfilePatch {
                bio: Some("Systems programmer".to_string()),
                skills: Some(vec![" rust ".to_string(), "".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(user.profile.bio, "Systems programmer");
        assert_eq!(user.profile.skills, vec!["rust".to_string()]);
        assert_eq!(user.profile.github, "https://github.com/alice");
    }
}
