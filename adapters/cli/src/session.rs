//! Wiring between the world, its systems, the position feed and a view.

use anyhow::{Context, Result as AnyResult};
use geocache_core::{Command, Event, GameConfig};
use geocache_system_sensor::{ScriptedPositionSource, Sensor, SensorEvent};
use geocache_system_status::Status;
use geocache_view::{View, ViewBridge};
use geocache_world::{self as world, query, World};
use tracing::info;

/// One running game.
///
/// Commands are applied strictly one at a time: every command runs to
/// completion, its events are routed to the status panel and the view, and
/// only then is the next sensor notification drained.
pub(crate) struct Session<V> {
    config: GameConfig,
    world: World,
    sensor: Sensor,
    status: Status,
    bridge: ViewBridge,
    source: ScriptedPositionSource,
    view: V,
}

impl<V: View> Session<V> {
    /// Builds the world, populates the first window, then subscribes to the
    /// position source.
    pub(crate) fn start(
        config: GameConfig,
        source: ScriptedPositionSource,
        view: V,
    ) -> AnyResult<(Self, Vec<Event>)> {
        let world = World::new(&config);
        let bridge = ViewBridge::new(*query::grid(&world));
        let mut session = Self {
            sensor: Sensor::new(&config.sensor),
            status: Status::new(),
            config,
            world,
            bridge,
            source,
            view,
        };
        let events = session.boot()?;
        Ok((session, events))
    }

    fn boot(&mut self) -> AnyResult<Vec<Event>> {
        info!(banner = query::welcome_banner(&self.world), "starting session");
        let mut events = Vec::new();
        let span = self.view.visible_span();
        self.dispatch(Command::SetViewport { span }, &mut events)?;
        self.dispatch(Command::Initialize, &mut events)?;

        let mut commands = Vec::new();
        self.sensor.subscribe(&mut self.source, &mut commands);
        for command in commands {
            self.dispatch(command, &mut events)?;
        }
        self.pump(&mut events)?;
        Ok(events)
    }

    fn dispatch(&mut self, command: Command, events: &mut Vec<Event>) -> AnyResult<()> {
        let start = events.len();
        world::apply(&mut self.world, command, events);
        let batch = &events[start..];
        self.status.handle(batch);
        self.bridge.route(batch, &mut self.view)
    }

    fn pump(&mut self, events: &mut Vec<Event>) -> AnyResult<()> {
        while let Some(command) = self.sensor.poll() {
            self.dispatch(command, events)?;
        }
        Ok(())
    }

    /// Applies a player command, then any sensor notifications it let through.
    pub(crate) fn submit(&mut self, command: Command) -> AnyResult<Vec<Event>> {
        let mut events = Vec::new();
        self.dispatch(command, &mut events)?;
        self.pump(&mut events)?;
        Ok(events)
    }

    /// Pushes a notification through the position source.
    pub(crate) fn feed(&mut self, event: SensorEvent) -> AnyResult<Vec<Event>> {
        self.source.push(event);
        let mut events = Vec::new();
        self.pump(&mut events)?;
        Ok(events)
    }

    /// Throws the current game away and starts over at the fallback position.
    pub(crate) fn restart(&mut self) -> AnyResult<Vec<Event>> {
        self.sensor
            .unsubscribe(&mut self.source)
            .context("failed to stop the position feed")?;
        self.world = World::new(&self.config);
        self.status = Status::new();
        info!("game restarted");
        self.boot()
    }

    /// Unsubscribes from the position source and hands the view back.
    pub(crate) fn shutdown(mut self) -> AnyResult<V> {
        self.sensor
            .unsubscribe(&mut self.source)
            .context("failed to stop the position feed")?;
        Ok(self.view)
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn status(&self) -> &Status {
        &self.status
    }

    pub(crate) fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &ScriptedPositionSource {
        &self.source
    }
}
