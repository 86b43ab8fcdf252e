use super::{RECENT_TICKETS, TicketService};
use crate::attachments::Upload;
use crate::core::access::{
    authorize_assignment, authorize_comment, authorize_dashboard, authorize_manager,
    authorize_staff, authorize_status_change,
};
use crate::core::lifecycle::{
    freeze_cutoff, is_freeze_eligible, plan_assignment, plan_comment, plan_status_change,
};
use crate::core::numbering::next_ticket_no;
use crate::core::{
    Caller, DashboardStats, GroupBy, NewStatusLog, NewTicket, Scope, StatusChange, StoredFile,
    Ticket, TicketDetail, TicketFilter, TicketNo, Transition,
};
use crate::error::{OfficeTicketError, Result};
use chrono::{DateTime, Datelike, Utc};

/// How often a transition is re-planned after losing a race on the row
const TRANSITION_ATTEMPTS: u32 = 3;

impl TicketService {
    /// File a new ticket
    ///
    /// Anyone may file a ticket. Attachments are validated and written before
    /// the number is allocated and removed again if the insert fails.
    pub async fn create_ticket(&self, intake: NewTicket, uploads: Vec<Upload>) -> Result<Ticket> {
        let intake = intake.validate()?;
        let now = self.clock.utc();

        let stored = self
            .blobs
            .store_all(&uploads, now.timestamp_millis())
            .await?;
        let ticket = match self.insert_ticket(intake, &stored, now).await {
            Ok(ticket) => ticket,
            Err(e) => {
                self.blobs.remove_all(&stored).await;
                return Err(e);
            },
        };

        tracing::info!(
            ticket_no = %ticket.ticket_no,
            attachments = stored.len(),
            "Ticket created"
        );
        self.notify(
            &ticket.employee_email,
            self.templates.ticket_created(&ticket),
        );
        Ok(ticket)
    }

    /// Allocate a number and insert, retrying when another writer took it first
    async fn insert_ticket(
        &self,
        intake: NewTicket,
        attachments: &[StoredFile],
        now: DateTime<Utc>,
    ) -> Result<Ticket> {
        let year = now.year();
        let mut attempt = 1;
        loop {
            let latest = self.store.latest_ticket_no(year).await?;
            let ticket = Ticket::open(next_ticket_no(latest.as_ref(), year), intake.clone(), now);
            let log = NewStatusLog {
                ticket_no: ticket.ticket_no.clone(),
                status: ticket.status,
                updated_by: ticket.employee_name.clone(),
                comment: "Ticket created".to_string(),
                updated_at: now,
            };

            match self.store.create_ticket(&ticket, attachments, &log).await {
                Ok(()) => return Ok(ticket),
                Err(e) if e.is_retryable() && attempt < self.allocation_retries => {
                    tracing::debug!("{e}; retrying allocation (attempt {attempt})");
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// A ticket with its attachments and audit trail
    ///
    /// Readable without authentication, so that submitters can follow up by
    /// ticket number.
    pub async fn ticket_detail(&self, ticket_no: &TicketNo) -> Result<TicketDetail> {
        let ticket = self.store.load_ticket(ticket_no).await?;
        let (attachments, logs) = tokio::try_join!(
            self.store.attachments(ticket_no),
            self.store.logs(ticket_no)
        )?;
        Ok(TicketDetail {
            ticket,
            attachments,
            logs,
        })
    }

    /// Tickets visible to the caller, narrowed by `filter`
    pub async fn list_tickets(&self, caller: &Caller, filter: TicketFilter) -> Result<Vec<Ticket>> {
        let identity = caller.identity()?;
        let scope = Scope::for_identity(identity)?;
        self.store.find_tickets(&scope.restrict(filter)).await
    }

    /// Tickets the caller filed, whatever their role
    pub async fn my_tickets(&self, caller: &Caller) -> Result<Vec<Ticket>> {
        let identity = caller.identity()?;
        let scope = Scope::Owner(identity.email.clone());
        self.store
            .find_tickets(&scope.restrict(TicketFilter::default()))
            .await
    }

    /// Department tickets for the manager view
    pub async fn manager_tickets(
        &self,
        caller: &Caller,
        filter: TicketFilter,
    ) -> Result<Vec<Ticket>> {
        authorize_manager(caller.identity()?)?;
        self.list_tickets(caller, filter).await
    }

    /// Set a ticket's status (admin and IT only)
    pub async fn change_status(
        &self,
        caller: &Caller,
        ticket_no: &TicketNo,
        change: StatusChange,
    ) -> Result<Ticket> {
        let identity = caller.identity()?;
        authorize_status_change(identity)?;

        let ticket = self
            .apply_fresh(ticket_no, |ticket| {
                plan_status_change(ticket, change.clone(), &identity.email, self.clock.utc())
            })
            .await?;

        tracing::info!(
            ticket_no = %ticket_no,
            from = %ticket.status,
            to = %change.status,
            by = %identity.email,
            "Ticket status changed"
        );
        self.notify(
            &ticket.employee_email,
            self.templates
                .ticket_updated(&ticket, change.status, change.comment.as_deref()),
        );
        self.store.load_ticket(ticket_no).await
    }

    /// Assign a ticket within the manager's department
    pub async fn assign_ticket(
        &self,
        caller: &Caller,
        ticket_no: &TicketNo,
        assigned_to: &str,
        comment: Option<&str>,
    ) -> Result<Ticket> {
        let identity = caller.identity()?;
        self.apply_fresh(ticket_no, |ticket| {
            authorize_assignment(identity, ticket)?;
            plan_assignment(ticket, assigned_to, comment, &identity.email, self.clock.utc())
        })
        .await?;

        tracing::info!(ticket_no = %ticket_no, assigned_to, by = %identity.email, "Ticket assigned");
        self.store.load_ticket(ticket_no).await
    }

    /// Load, plan and apply, planning again from the current row when another
    /// writer changed the status in between
    ///
    /// Returns the row the applied plan was made against.
    async fn apply_fresh<F>(&self, ticket_no: &TicketNo, plan: F) -> Result<Ticket>
    where
        F: Fn(&Ticket) -> Result<Transition>,
    {
        let mut attempt = 1;
        loop {
            let ticket = self.store.load_ticket(ticket_no).await?;
            let transition = plan(&ticket)?;
            match self.store.apply_transition(&transition).await {
                Ok(()) => return Ok(ticket),
                Err(e @ OfficeTicketError::TicketModified { .. })
                    if attempt < TRANSITION_ATTEMPTS =>
                {
                    tracing::debug!("{e}; planning again (attempt {attempt})");
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Append a comment to the caller's own ticket
    pub async fn add_comment(
        &self,
        caller: &Caller,
        ticket_no: &TicketNo,
        comment: &str,
    ) -> Result<()> {
        let identity = caller.identity()?;
        let ticket = self.store.load_ticket(ticket_no).await?;
        authorize_comment(identity, &ticket)?;

        let log = plan_comment(&ticket, comment, &identity.email, self.clock.utc())?;
        self.store.append_log(&log).await?;
        tracing::debug!(ticket_no = %ticket_no, by = %identity.email, "Comment added");
        Ok(())
    }

    /// Freeze resolved tickets whose reopen window has passed
    ///
    /// Returns how many tickets were frozen; a second run right after
    /// returns zero.
    pub async fn freeze_sweep(&self, caller: &Caller) -> Result<u64> {
        authorize_staff(caller.identity()?, "freeze tickets")?;

        let now = self.clock.utc();
        let expired: Vec<TicketNo> = self
            .store
            .resolved_unfrozen()
            .await?
            .into_iter()
            .filter(|ticket| is_freeze_eligible(ticket, now))
            .map(|ticket| ticket.ticket_no)
            .collect();

        let frozen = self.store.mark_frozen(&expired, freeze_cutoff(now)).await?;
        tracing::info!(frozen, "Freeze sweep finished");
        Ok(frozen)
    }

    /// Dashboard aggregates, restricted to the manager's department when
    /// the caller is a manager
    pub async fn dashboard(&self, caller: &Caller) -> Result<DashboardStats> {
        let scope = authorize_dashboard(caller.identity()?)?;
        let department = scope.department();

        let (total, by_status, by_department, by_location, recent_tickets) = tokio::try_join!(
            self.store.count_tickets(department),
            self.store.count_grouped(GroupBy::Status, department),
            self.store.count_grouped(GroupBy::Department, department),
            self.store.count_grouped(GroupBy::Location, department),
            self.store.recent_tickets(department, RECENT_TICKETS),
        )?;

        Ok(DashboardStats {
            department: department.map(String::from),
            total,
            by_status,
            by_department,
            by_location,
            recent_tickets,
        })
    }

    /// Department aggregates for the manager view
    pub async fn manager_stats(&self, caller: &Caller) -> Result<DashboardStats> {
        authorize_manager(caller.identity()?)?;
        self.dashboard(caller).await
    }
}
