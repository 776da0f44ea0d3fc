//! Plain-text rendition of the map for terminals.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use geocache_core::{CacheAction, Cell, LatLng, TransitionError, VictoryTrigger, ViewportSpan};
use geocache_view::{CacheDialog, CacheMarker, View};

/// View that narrates the map as lines of text.
#[derive(Debug)]
pub(crate) struct TextView<W> {
    out: W,
    span: Option<ViewportSpan>,
}

impl<W: Write> TextView<W> {
    /// Creates a view writing to `out`; `span` emulates a visible map area.
    pub(crate) fn new(out: W, span: Option<ViewportSpan>) -> Self {
        Self { out, span }
    }

    /// Writes a free-form line below the map narration.
    pub(crate) fn line(&mut self, text: &str) -> AnyResult<()> {
        writeln!(self.out, "{text}").context("failed to write to the terminal")
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> View for TextView<W> {
    fn visible_span(&self) -> Option<ViewportSpan> {
        self.span
    }

    fn recenter(&mut self, effective: LatLng) -> AnyResult<()> {
        self.line(&format!(
            "You are at {:.6}, {:.6}",
            effective.lat(),
            effective.lng()
        ))
    }

    fn show_cache(&mut self, marker: CacheMarker) -> AnyResult<()> {
        if !marker.in_range {
            return Ok(());
        }
        self.line(&format!(
            "  cache {},{} holds {} points (in reach)",
            marker.cell.i(),
            marker.cell.j(),
            marker.value
        ))
    }

    fn update_cache(&mut self, cell: Cell, value: u32) -> AnyResult<()> {
        self.line(&format!("Cache {},{} now holds {value}", cell.i(), cell.j()))
    }

    fn remove_cache(&mut self, _cell: Cell) -> AnyResult<()> {
        Ok(())
    }

    fn show_dialog(&mut self, dialog: CacheDialog) -> AnyResult<()> {
        let (i, j) = (dialog.cell.i(), dialog.cell.j());
        if !dialog.is_interactive() {
            return self.line(&format!("This cache at \"{i},{j}\" is too far away!"));
        }
        let actions: Vec<&str> = dialog.actions.iter().copied().map(action_name).collect();
        self.line(&format!(
            "There is a cache here at \"{i},{j}\". It has value {}. [{}]",
            dialog.value,
            actions.join(" | ")
        ))
    }

    fn dismiss_dialog(&mut self, _cell: Cell) -> AnyResult<()> {
        Ok(())
    }

    fn show_rejection(
        &mut self,
        cell: Cell,
        action: CacheAction,
        reason: TransitionError,
    ) -> AnyResult<()> {
        self.line(&format!(
            "Cannot {} at {},{}: {reason}",
            action_name(action),
            cell.i(),
            cell.j()
        ))
    }

    fn show_victory(&mut self, trigger: VictoryTrigger, value: u32) -> AnyResult<()> {
        let place = match trigger {
            VictoryTrigger::Held => "in your hands".to_owned(),
            VictoryTrigger::Cache { cell } => format!("in cache {},{}", cell.i(), cell.j()),
        };
        self.line(&format!(
            "*** You won! {value} points {place}. Type `restart` to play again. ***"
        ))
    }
}

fn action_name(action: CacheAction) -> &'static str {
    match action {
        CacheAction::Take => "take",
        CacheAction::Place => "place",
        CacheAction::Destroy => "destroy",
    }
}
