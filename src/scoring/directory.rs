use super::dataset::{DatasetError, DatasetSource, Sex};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Identity details recorded for a roster member at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: String,
    pub phone_number: String,
    pub sex: Option<Sex>,
}

/// Read-only view of the roster held in the dataset.
#[derive(Debug, Clone)]
pub struct UserDirectory<S> {
    source: S,
}

impl<S: DatasetSource> UserDirectory<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Distinct trimmed user ids across all data rows.
    pub fn list_user_ids(&self) -> Result<BTreeSet<String>, DatasetError> {
        let dataset = self.source.load()?;
        Ok(dataset
            .records()
            .filter_map(|row| row.identity())
            .map(|(_, user_id)| user_id.to_string())
            .collect())
    }

    /// True when some row carries exactly this (user id, phone number) pair.
    pub fn validate(&self, user_id: &str, phone_number: &str) -> Result<bool, DatasetError> {
        let dataset = self.source.load()?;
        let matched = dataset
            .records()
            .filter_map(|row| row.identity())
            .any(|(phone, id)| phone == phone_number && id == user_id);

        debug!(user_id, matched, "credential check");
        Ok(matched)
    }

    pub fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatasetError> {
        let dataset = self.source.load()?;
        let profile = dataset.find_row(user_id).and_then(|row| {
            row.identity().map(|(phone, id)| UserProfile {
                user_id: id.to_string(),
                phone_number: phone.to_string(),
                sex: dataset.sex_of(&row),
            })
        });
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::dataset::InMemoryDataset;

    const ROSTER: &str = "PhoneNumber,User_ID,Sex\n\
0400000001, 11 ,Male\n\
0400000002,12,Female\n\
broken\n\
0400000003,11,Female\n";

    fn directory() -> UserDirectory<InMemoryDataset> {
        UserDirectory::new(InMemoryDataset::new(ROSTER))
    }

    #[test]
    fn lists_distinct_trimmed_ids() {
        let ids = directory().list_user_ids().expect("ids load");
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["11".to_string(), "12".to_string()]
        );
    }

    #[test]
    fn validate_requires_matching_pair() {
        let directory = directory();
        assert!(directory.validate("11", "0400000001").expect("lookup"));
        assert!(directory.validate("11", "0400000003").expect("lookup"));
        assert!(!directory.validate("12", "0400000001").expect("lookup"));
        assert!(!directory.validate("broken", "broken").expect("lookup"));
        assert!(!directory.validate("", "").expect("lookup"));
    }

    #[test]
    fn validate_on_empty_dataset_is_false() {
        let directory = UserDirectory::new(InMemoryDataset::new(""));
        assert!(!directory.validate("1", "0400000001").expect("lookup"));
        assert!(directory.list_user_ids().expect("ids").is_empty());
    }

    #[test]
    fn header_only_dataset_has_no_users() {
        let directory = UserDirectory::new(InMemoryDataset::new("PhoneNumber,User_ID,Sex\n"));
        assert!(directory.list_user_ids().expect("ids").is_empty());
    }

    #[test]
    fn find_profile_uses_first_matching_row() {
        let profile = directory()
            .find_profile("11")
            .expect("lookup")
            .expect("profile present");
        assert_eq!(profile.phone_number, "0400000001");
        assert_eq!(profile.sex, Some(Sex::Male));
        assert!(directory().find_profile("99").expect("lookup").is_none());
    }
}
