use std::collections::{BTreeMap, HashMap, HashSet};

use sha2::{Digest, Sha256};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::models::cash_register::CashRegister;
use crate::domain::models::enrollment::Enrollment;
use crate::domain::models::exercise::Exercise;
use crate::domain::models::plan::Plan;
use crate::domain::models::student::{Person, StudentRecord};
use crate::domain::models::user::SystemUser;
use crate::domain::session::{Company, License};

/// A system user together with its credential hash
#[derive(Debug, Clone)]
pub(crate) struct StoredUser {
    pub user: SystemUser,
    pub password_hash: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    /// In opening order
    pub registers: Vec<CashRegister>,
    pub people: HashMap<String, Person>,
    pub students: BTreeMap<String, StudentRecord>,
    /// student id -> credential hash
    pub credentials: HashMap<String, String>,
    pub enrollments: Vec<Enrollment>,
    pub plans: BTreeMap<String, Plan>,
    pub users: BTreeMap<String, StoredUser>,
    pub exercises: BTreeMap<String, Exercise>,
    /// ids of users with a live session
    pub sessions: HashSet<String>,
    pub company: Option<Company>,
    pub license: Option<License>,
    /// Last issued person code / student registration number
    pub sequence: u64,
}

impl Tables {
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// Shared in-process database. Every memory repository holds an `Arc` to
/// the same connection, so they observe each other's writes.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    tables: RwLock<Tables>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }

    /// Credential hash stored for a student, for inspection
    pub async fn student_credential(&self, student_id: &str) -> Option<String> {
        self.read().await.credentials.get(student_id).cloned()
    }

    pub async fn set_company(&self, company: Company) {
        self.write().await.company = Some(company);
    }

    pub async fn set_license(&self, license: Option<License>) {
        self.write().await.license = license;
    }
}

/// SHA-256 hex digest used in place of the server's credential hash
pub fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}
