/// Address creation and cascading deletion
///
/// Deletion runs four single statements in a fixed order with no enclosing
/// transaction. Removing the address row is irrevocable: later failures are
/// reported, never rolled back. Which steps decide the reported outcome is
/// fixed by [`CascadeStep::policy`].
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{AdminError, Result};
use crate::store::{Database, Statement, column_i64, column_str};
use crate::utils::redact_address;

/// What deleting an address does with its inbound mail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MailCascade {
    /// Mail rows stay behind, addressed to a name that no longer exists
    #[default]
    Orphan,
    /// Mail rows for the address are deleted with it
    Purge,
}

/// Builds the final address string from user input
pub trait AddressNamer: Send + Sync {
    fn build(&self, name: &str, domain: Option<&str>, enable_prefix: bool) -> Result<String>;
}

/// Namer driven by the configured prefix and domain list
#[derive(Debug, Clone)]
pub struct ConfiguredNamer {
    prefix: String,
    domains: Vec<String>,
}

impl ConfiguredNamer {
    pub fn new(prefix: impl Into<String>, domains: Vec<String>) -> Self {
        Self {
            prefix: prefix.into(),
            domains,
        }
    }
}

impl AddressNamer for ConfiguredNamer {
    fn build(&self, name: &str, domain: Option<&str>, enable_prefix: bool) -> Result<String> {
        let local: String = name
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        if local.is_empty() {
            return Err(AdminError::Validation("Name too short".to_string()));
        }

        let local = if enable_prefix {
            format!("{}{}", self.prefix, local)
        } else {
            local
        };

        let domain = match domain.map(str::trim).filter(|d| !d.is_empty()) {
            Some(domain) => {
                let domain = domain.to_lowercase();
                if !self.domains.contains(&domain) {
                    return Err(AdminError::Validation(format!("Invalid domain: {}", domain)));
                }
                domain
            }
            None => self
                .domains
                .choose(&mut rand::thread_rng())
                .cloned()
                .ok_or_else(|| AdminError::Config("No domains configured".to_string()))?,
        };

        Ok(format!("{}@{}", local, domain))
    }
}

/// Name of the address with `id`, if it exists
pub async fn name_by_id(db: &dyn Database, id: i64) -> Result<Option<String>> {
    let row = db
        .first(&Statement::new("SELECT name FROM address WHERE id = ?").bind(id))
        .await?;
    Ok(row
        .as_ref()
        .and_then(|r| column_str(r, "name"))
        .map(str::to_string))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAddress {
    pub id: i64,
    pub address: String,
}

/// Whether a step's failure changes the reported outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Failure makes the whole deletion unsuccessful
    Primary,
    /// Failure is logged and recorded but not reflected in `success`
    BestEffort,
}

/// Cascade steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    Address,
    Mails,
    SenderPermission,
    UserLinks,
}

impl CascadeStep {
    pub const ORDER: [CascadeStep; 4] = [
        Self::Address,
        Self::Mails,
        Self::SenderPermission,
        Self::UserLinks,
    ];

    pub fn policy(self) -> StepPolicy {
        match self {
            Self::Address | Self::Mails => StepPolicy::Primary,
            Self::SenderPermission | Self::UserLinks => StepPolicy::BestEffort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Done { rows_affected: u64 },
    /// Nothing to do under the current policy or data
    Skipped,
    Failed { error: String },
    /// Not attempted because the address row could not be removed
    NotRun,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Skipped)
    }
}

/// Per-step record of one deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub id: i64,
    pub address: Option<String>,
    pub steps: Vec<(CascadeStep, StepOutcome)>,
}

impl CascadeReport {
    /// AND of the primary steps
    pub fn success(&self) -> bool {
        self.steps
            .iter()
            .filter(|(step, _)| step.policy() == StepPolicy::Primary)
            .all(|(_, outcome)| outcome.is_ok())
    }

    pub fn outcome(&self, step: CascadeStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, o)| o)
    }

    /// First primary step that failed
    pub fn failed_primary_step(&self) -> Option<CascadeStep> {
        self.steps
            .iter()
            .find(|(step, outcome)| step.policy() == StepPolicy::Primary && !outcome.is_ok())
            .map(|(step, _)| *step)
    }
}

pub struct AddressLifecycle<'a> {
    db: &'a dyn Database,
    namer: &'a dyn AddressNamer,
    mail_cascade: MailCascade,
}

impl<'a> AddressLifecycle<'a> {
    pub fn new(db: &'a dyn Database, namer: &'a dyn AddressNamer, mail_cascade: MailCascade) -> Self {
        Self {
            db,
            namer,
            mail_cascade,
        }
    }

    /// Insert a new address. No send permission row is created.
    pub async fn create(
        &self,
        name: &str,
        domain: Option<&str>,
        enable_prefix: bool,
    ) -> Result<NewAddress> {
        if name.trim().is_empty() {
            return Err(AdminError::Validation("Please provide a name".to_string()));
        }

        let address = self.namer.build(name, domain, enable_prefix)?;

        self.db
            .run(&Statement::new("INSERT INTO address (name) VALUES (?)").bind(&address))
            .await
            .map_err(|e| match e {
                AdminError::Conflict(_) => {
                    AdminError::Validation("Address already exists".to_string())
                }
                other => other,
            })?;

        let row = self
            .db
            .first(&Statement::new("SELECT id FROM address where name = ?").bind(&address))
            .await?;
        let id = row
            .as_ref()
            .and_then(|r| column_i64(r, "id"))
            .ok_or_else(|| AdminError::Storage("Created address could not be read back".to_string()))?;

        info!(address_id = id, address = %redact_address(&address), "Address created");
        Ok(NewAddress { id, address })
    }

    /// Delete the address and everything that references it.
    ///
    /// `Err` is returned only when the initial name lookup fails, before any
    /// row has been touched. Statement failures after that are reported in
    /// the [`CascadeReport`].
    #[instrument(name = "address.delete", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<CascadeReport> {
        let name = name_by_id(self.db, id).await?;
        let mut report = CascadeReport {
            id,
            address: name.clone(),
            steps: Vec::with_capacity(CascadeStep::ORDER.len()),
        };

        for step in CascadeStep::ORDER {
            if step != CascadeStep::Address
                && !report
                    .outcome(CascadeStep::Address)
                    .is_some_and(StepOutcome::is_ok)
            {
                report.steps.push((step, StepOutcome::NotRun));
                continue;
            }

            let outcome = match self.statement_for(step, id, name.as_deref()) {
                Some(statement) => match self.db.run(&statement).await {
                    Ok(result) => StepOutcome::Done {
                        rows_affected: result.rows_affected,
                    },
                    Err(e) => StepOutcome::Failed {
                        error: e.to_string(),
                    },
                },
                None => StepOutcome::Skipped,
            };

            match (&outcome, step.policy()) {
                (StepOutcome::Failed { error }, StepPolicy::Primary) => {
                    warn!(step = ?step, error = %error, "Cascade step failed");
                }
                (StepOutcome::Failed { error }, StepPolicy::BestEffort) => {
                    warn!(step = ?step, error = %error, "Best-effort cascade step failed, ignoring");
                }
                _ => debug!(step = ?step, outcome = ?outcome, "Cascade step finished"),
            }

            report.steps.push((step, outcome));
        }

        info!(
            address = %name.as_deref().map(redact_address).unwrap_or_default(),
            success = report.success(),
            "Address deletion finished"
        );
        Ok(report)
    }

    fn statement_for(&self, step: CascadeStep, id: i64, name: Option<&str>) -> Option<Statement> {
        match step {
            CascadeStep::Address => {
                Some(Statement::new("DELETE FROM address WHERE id = ?").bind(id))
            }
            CascadeStep::Mails => match self.mail_cascade {
                // Runs after the address row is gone, so it matches nothing
                // and the mail stays behind. Its failure still gates success.
                MailCascade::Orphan => Some(
                    Statement::new(
                        "DELETE FROM raw_mails WHERE address IN \
                         (select name from address where id = ?)",
                    )
                    .bind(id),
                ),
                MailCascade::Purge => {
                    name.map(|n| Statement::new("DELETE FROM raw_mails WHERE address = ?").bind(n))
                }
            },
            CascadeStep::SenderPermission => {
                name.map(|n| Statement::new("DELETE FROM address_sender WHERE address = ?").bind(n))
            }
            CascadeStep::UserLinks => {
                Some(Statement::new("DELETE FROM users_address WHERE address_id = ?").bind(id))
            }
        }
    }
}
