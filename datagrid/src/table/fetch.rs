//! Server-side fetching with generation tickets.
//!
//! Every query the table sends out carries the generation it was issued
//! under. Filter, sort, page size and (outside virtual scroll) page changes
//! start a new generation; results of older generations are dropped when
//! they arrive. There is no cancellation: a stale request simply runs to
//! completion and is ignored.

use super::DataTable;
use super::TableState;
use super::Trigger;
use crate::error::DataAccessError;
use crate::error::GridError;
use crate::query::PageQuery;
use crate::query::PageResult;

/// A request for server rows, to be completed with
/// [`DataTable::complete_fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    /// Generation the query was issued under.
    pub generation: u64,
    /// What to fetch.
    pub query: PageQuery,
    /// The result replaces every fetched row instead of adding to them.
    pub replace: bool,
}

impl DataTable {
    /// Current query generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Takes the tickets issued by the last changes. Each should be answered
    /// through [`complete_fetch`](Self::complete_fetch).
    pub fn take_pending_fetches(&mut self) -> Vec<FetchTicket> {
        std::mem::take(&mut self.pending)
    }

    /// Starts a new generation and issues a ticket for the current window.
    ///
    /// Emits `loading(true)` and a fetch request.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.in_flight = 0;
        let page = if self.settings.virtual_scroll {
            let page = self
                .virtualizer
                .page_from_offset(self.virtualizer.scroll_top());
            self.pager.mark_viewed(page);
            page
        } else {
            self.pager.current()
        };
        self.issue(page, true)
    }

    /// Applies a fetch result if its ticket is still current.
    ///
    /// Returns `false` for stale tickets. A failed fetch empties the row
    /// window and leaves the table in [`TableState::RemoteError`]; the next
    /// change fetches again.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResult, DataAccessError>,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping stale fetch of generation {} (current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.in_flight = self.in_flight.saturating_sub(1);

        match result {
            Ok(page) => {
                log::debug!(
                    "Fetched {} rows at {} of {}",
                    page.rows.len(),
                    ticket.query.start,
                    page.total
                );
                if ticket.replace {
                    self.window.clear();
                }
                self.window.set_total(page.total);
                self.pager.set_total(page.total);
                if self.settings.virtual_scroll {
                    self.pager.mark_viewed(ticket.query.page);
                }
                self.window.merge(ticket.query.start, page.rows);
                self.last_error = None;
                // A new generation starts from one page; the rendered rows
                // can span more once the total is known.
                if self.settings.virtual_scroll && ticket.replace {
                    self.fetch_visible_pages();
                }
                if self.in_flight == 0 {
                    self.state = TableState::RemoteIdle;
                }
            }
            Err(err) => {
                log::debug!("Fetch of generation {} failed: {err}", ticket.generation);
                self.window.clear();
                self.pager.clear_cache();
                self.last_error = Some(err);
                self.state = TableState::RemoteError;
                // Outstanding requests of this generation are dropped too.
                self.generation += 1;
                self.in_flight = 0;
            }
        }

        if self.in_flight == 0 {
            self.events.loading.emit(false);
        }
        self.chunk_rows(true);

        // The server shrank the set below the requested page.
        if !self.settings.virtual_scroll
            && ticket.replace
            && self.last_error.is_none()
            && self.pager.current() != ticket.query.page.max(1)
        {
            self.dispatch(Trigger::PageChanged);
        }
        true
    }

    /// Fetches the current window from the configured source and applies it.
    ///
    /// Returns `Ok(false)` in local mode, where there is nothing to fetch.
    pub async fn fetch(&mut self) -> Result<bool, GridError> {
        if self.settings.client_side {
            return Ok(false);
        }
        let source = self.source.clone().ok_or_else(no_source)?;
        self.pending.clear();
        let ticket = self.begin_fetch();
        let result = source.fetch_page(&ticket.query).await;
        let error = result.as_ref().err().cloned();
        let applied = self.complete_fetch(ticket, result);
        match error {
            Some(err) => Err(err.into()),
            None => Ok(applied),
        }
    }

    /// Answers every pending ticket from the configured source, including
    /// tickets issued while applying earlier results.
    ///
    /// Returns the number of results applied. Stops at the first failure.
    pub async fn sync_remote(&mut self) -> Result<usize, GridError> {
        if self.settings.client_side {
            self.pending.clear();
            return Ok(0);
        }
        let source = self.source.clone().ok_or_else(no_source)?;
        let mut applied = 0;
        loop {
            let tickets = self.take_pending_fetches();
            if tickets.is_empty() {
                return Ok(applied);
            }
            for ticket in tickets {
                let result = source.fetch_page(&ticket.query).await;
                let error = result.as_ref().err().cloned();
                if !self.complete_fetch(ticket, result) {
                    continue;
                }
                if let Some(err) = error {
                    self.pending.clear();
                    return Err(err.into());
                }
                applied += 1;
            }
        }
    }

    /// Issues tickets for pages under the rendered rows that were not
    /// requested yet.
    pub(super) fn fetch_visible_pages(&mut self) {
        let rendered = self.virtualizer.visible_range(self.window.total());
        let (first, last) = if rendered.is_empty() {
            let page = self
                .virtualizer
                .page_from_offset(self.virtualizer.scroll_top());
            (page, page)
        } else {
            (
                self.pager.page_of(rendered.start),
                self.pager.page_of(rendered.end - 1),
            )
        };
        for page in first..=last {
            if self.pager.is_page_viewed(page) {
                continue;
            }
            self.pager.mark_viewed(page);
            let ticket = self.issue(page, false);
            self.pending.push(ticket);
        }
    }

    /// Issues a ticket for `page` under the current generation.
    fn issue(&mut self, page: usize, replace: bool) -> FetchTicket {
        let start = self.pager.page_start(page);
        let count = usize::try_from(self.pager.per_page()).unwrap_or(usize::MAX);
        let filter = match (
            self.filter.to_filter(),
            self.filter.global_filter(&self.columns),
        ) {
            (Some(columns), Some(global)) => Some(columns.and_also(global)),
            (columns, global) => columns.or(global),
        };
        let ticket = FetchTicket {
            generation: self.generation,
            query: PageQuery {
                filter,
                order: self.order.clone(),
                start,
                count,
                page,
                per_page: self.pager.per_page(),
            },
            replace,
        };
        log::debug!(
            "Fetch page {page} ({start}+{count}) in generation {}",
            self.generation
        );

        self.in_flight += 1;
        if !self.state.is_loading() {
            self.events.loading.emit(true);
        }
        self.state = TableState::RemoteLoading;
        self.events.fetch.emit(ticket.clone());
        ticket
    }
}

fn no_source() -> GridError {
    DataAccessError::fetch("no row source configured").into()
}
