/// Application constants
///
/// This module contains all hardcoded values used throughout the control plane.
/// Constants are organized by category for easy maintenance.
// ============================================================================
// Pagination
// ============================================================================
/// Page size used when `limit` is absent or unusable
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a single list request may return
pub const MAX_PAGE_SIZE: i64 = 100;

// ============================================================================
// Settings Keys
// ============================================================================

/// Patterns rejected when creating addresses
pub const ADDRESS_BLOCK_LIST_KEY: &str = "address_block_list";

/// Patterns rejected as outbound recipients
pub const SEND_BLOCK_LIST_KEY: &str = "send_block_list";

// ============================================================================
// Statistics
// ============================================================================

/// Window for counting an address as active
pub const ACTIVE_USER_WINDOW_DAYS: i64 = 7;

// ============================================================================
// Notifications
// ============================================================================

/// Default `From` of notification mails written into a user's inbox
pub const DEFAULT_ADMIN_MAIL_SENDER: &str = "admin@mail.internal";

/// Subject of the mail sent after a send-permission change
pub const SEND_ACCESS_UPDATED_SUBJECT: &str = "Account Send Access Updated";
