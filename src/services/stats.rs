//! Dashboard counters for the admin overview.

use serde::Serialize;
use sqlx::PgPool;

use crate::content::ContentError;
use crate::content::records::{ContactMessage, PortfolioItem, Product};
use crate::content::repo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub portfolio: i64,
    pub active_products: i64,
    pub messages: i64,
    pub unread_messages: i64,
}

/// Count dashboard figures concurrently.
///
/// # Errors
///
/// Returns the first database error encountered.
pub async fn admin_stats(pool: &PgPool) -> Result<AdminStats, ContentError> {
    let (portfolio, active_products, messages, unread_messages) = tokio::try_join!(
        repo::count::<PortfolioItem>(pool, None),
        repo::count::<Product>(pool, Some(("is_active", true))),
        repo::count::<ContactMessage>(pool, None),
        repo::count::<ContactMessage>(pool, Some(("is_read", false))),
    )?;

    Ok(AdminStats { portfolio, active_products, messages, unread_messages })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialize_flat() {
        let stats = AdminStats { portfolio: 4, active_products: 2, messages: 9, unread_messages: 3 };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"portfolio": 4, "active_products": 2, "messages": 9, "unread_messages": 3})
        );
    }
}
