//! Bid repository operations.
//!
//! The status cascade (approving a bid closes its opportunity and assigns
//! the contractor) runs inside a single transaction, so the bid write and
//! the opportunity write commit or roll back together.

use sqlx::Row;
use uuid::Uuid;

use super::opportunities::{opportunity_from_row, OPPORTUNITY_COLUMNS};
use super::{from_json, now_rfc3339, to_json, Repository};
use crate::errors::AppError;
use crate::models::{Bid, BidStatus, CreateBidRequest, OpportunityStatus};

const BID_COLUMNS: &str = "id, project_id, contractor_id, price, timeline, start_date, \
     end_date, status, attachments, opportunity_id, created_at, updated_at";

impl Repository {
    /// List all bids for a project.
    pub async fn list_bids_for_project(&self, project_id: &str) -> Result<Vec<Bid>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE project_id = ? ORDER BY created_at"
        ))
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(bid_from_row).collect())
    }

    /// List a single contractor's bids for a project.
    pub async fn list_bids_for_contractor(
        &self,
        project_id: &str,
        contractor_id: &str,
    ) -> Result<Vec<Bid>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE project_id = ? AND contractor_id = ? ORDER BY created_at"
        ))
        .bind(project_id)
        .bind(contractor_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(bid_from_row).collect())
    }

    /// Get a bid by ID.
    pub async fn get_bid(&self, id: &str) -> Result<Option<Bid>, AppError> {
        let row = sqlx::query(&format!("SELECT {BID_COLUMNS} FROM bids WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(bid_from_row))
    }

    /// Submit a new bid. Bids always start PENDING.
    pub async fn create_bid(&self, request: &CreateBidRequest) -> Result<Bid, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            r#"INSERT INTO bids (
                id, project_id, contractor_id, price, timeline, start_date,
                end_date, status, attachments, opportunity_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'PENDING', ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.project_id)
        .bind(&request.contractor_id)
        .bind(request.price)
        .bind(&request.timeline)
        .bind(&request.start_date)
        .bind(&request.end_date)
        .bind(to_json(&request.attachments))
        .bind(&request.opportunity_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Bid {
            id,
            project_id: request.project_id.clone(),
            contractor_id: request.contractor_id.clone(),
            price: request.price,
            timeline: request.timeline.clone(),
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
            status: BidStatus::Pending,
            attachments: request.attachments.clone(),
            opportunity_id: request.opportunity_id.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Set a bid's status and cascade the change to the linked opportunity.
    ///
    /// - APPROVED closes the opportunity and assigns the bid's contractor.
    ///   Approving against an opportunity already closed for a different
    ///   contractor is a conflict, so at most one approved bid can hold an
    ///   opportunity at a time.
    /// - PENDING reopens the opportunity and clears the contractor.
    /// - REJECTED leaves the opportunity untouched.
    ///
    /// A missing opportunity rolls back the bid write as well.
    pub async fn set_bid_status(
        &self,
        bid_id: &str,
        status: BidStatus,
        opportunity_id: Option<&str>,
    ) -> Result<Bid, AppError> {
        let mut tx = self.pool().begin().await?;
        let now = now_rfc3339();

        let row = sqlx::query(&format!("SELECT {BID_COLUMNS} FROM bids WHERE id = ?"))
            .bind(bid_id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut bid = row
            .as_ref()
            .map(bid_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Bid {} not found", bid_id)))?;

        sqlx::query("UPDATE bids SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&now)
            .bind(bid_id)
            .execute(&mut *tx)
            .await?;

        if let Some(opp_id) = opportunity_id {
            let opp_row = sqlx::query(&format!(
                "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = ?"
            ))
            .bind(opp_id)
            .fetch_optional(&mut *tx)
            .await?;

            let opportunity = opp_row
                .as_ref()
                .map(opportunity_from_row)
                .ok_or_else(|| AppError::NotFound(format!("Opportunity {} not found", opp_id)))?;

            match status {
                BidStatus::Approved => {
                    if opportunity.status == OpportunityStatus::Closed
                        && opportunity.contractor_id.as_deref() != Some(bid.contractor_id.as_str())
                    {
                        return Err(AppError::Conflict(format!(
                            "Opportunity {} is already closed for another contractor",
                            opp_id
                        )));
                    }

                    sqlx::query(
                        "UPDATE opportunities SET status = 'CLOSED', contractor_id = ?, updated_at = ? WHERE id = ?"
                    )
                    .bind(&bid.contractor_id)
                    .bind(&now)
                    .bind(opp_id)
                    .execute(&mut *tx)
                    .await?;
                }
                BidStatus::Pending => {
                    sqlx::query(
                        "UPDATE opportunities SET status = 'OPEN', contractor_id = NULL, updated_at = ? WHERE id = ?"
                    )
                    .bind(&now)
                    .bind(opp_id)
                    .execute(&mut *tx)
                    .await?;
                }
                BidStatus::Rejected => {}
            }
        }

        tx.commit().await?;

        bid.status = status;
        bid.updated_at = now;
        Ok(bid)
    }

    /// Delete a bid.
    pub async fn delete_bid(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM bids WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Bid {} not found", id)));
        }

        Ok(())
    }
}

fn bid_from_row(row: &sqlx::sqlite::SqliteRow) -> Bid {
    let status: String = row.get("status");
    let attachments: Option<String> = row.get("attachments");

    Bid {
        id: row.get("id"),
        project_id: row.get("project_id"),
        contractor_id: row.get("contractor_id"),
        price: row.get("price"),
        timeline: row.get("timeline"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: BidStatus::from_str(&status).unwrap_or(BidStatus::Pending),
        attachments: from_json(attachments),
        opportunity_id: row.get("opportunity_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
