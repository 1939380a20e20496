/// Issuance tag for one asynchronous request.
///
/// Tickets are totally ordered by issuance: a larger ticket was issued later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Monotonic gate for results of overlapping asynchronous requests.
///
/// Every request takes a [`Ticket`] when it is issued. When the response
/// arrives it is offered back through [`Sequencer::accept`], which admits it
/// only if no later-issued ticket has been accepted already. Responses may
/// complete in any order; the state they feed never moves backwards.
///
/// Ordering contract:
/// - `issue` never returns the same ticket twice.
/// - `accept(t)` returns `true` at most once per ticket, and only while `t`
///   is greater than every previously accepted ticket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sequencer {
    next: u64,
    accepted: Option<Ticket>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket(self.next);
        self.next = self.next.wrapping_add(1);
        ticket
    }

    /// Offers a completed request. Returns `true` if its result should be applied.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        if ticket.0 >= self.next {
            // Never issued by this sequencer.
            return false;
        }
        match self.accepted {
            Some(last) if ticket <= last => false,
            _ => {
                self.accepted = Some(ticket);
                true
            }
        }
    }

    /// Issues and immediately accepts a ticket.
    ///
    /// Used when state is replaced synchronously (not through a request), so
    /// that every response still in flight becomes stale.
    pub fn supersede(&mut self) -> Ticket {
        let ticket = self.issue();
        self.accepted = Some(ticket);
        ticket
    }
}
