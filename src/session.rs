//! Interactive session state
//!
//! A [`Session`] owns one headless document, the scheduler for it and a
//! set of named tooltips. Each method backs one REPL command and returns
//! the line to print.

use std::collections::BTreeMap;
use std::time::Duration;

use clap::Args;
use perch_core::{
    HeadlessHost, Host, PerchError, Scheduler, SchedulerConfig, Tooltip, ViewportEvent, Visibility,
};
use perch_types::{OverlayOptions, Placement, Rect, Size};
use thiserror::Error;

use crate::args::parse_size;
use crate::config::{ConfigError, PerchConfig};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no tooltip named '{0}'")]
    UnknownTooltip(String),

    #[error("tooltip '{0}' already exists")]
    DuplicateTooltip(String),

    #[error(transparent)]
    Perch(#[from] PerchError),
}

/// Per-tooltip overrides of the configured defaults
#[derive(Debug, Clone, Default, Args)]
pub struct TipArgs {
    #[arg(short, long)]
    pub place: Option<Placement>,

    /// Flip away from viewport edges
    #[arg(short, long)]
    pub auto: bool,

    #[arg(short, long)]
    pub spacing: Option<f64>,

    /// Fixed element size as WIDTH,HEIGHT
    #[arg(long, value_parser = parse_size)]
    pub size: Option<Size>,

    /// Body text; sizes the element when --size is not given
    #[arg(short, long)]
    pub text: Option<String>,

    /// Effect class enabling show/hide transitions
    #[arg(short, long)]
    pub effect: Option<String>,

    /// Transition duration of the effect class in milliseconds
    #[arg(short, long, requires = "effect")]
    pub duration: Option<u64>,

    #[arg(short, long)]
    pub interactive: bool,
}

pub struct Session {
    scheduler: Scheduler<HeadlessHost>,
    tips: BTreeMap<String, Tooltip<HeadlessHost>>,
    defaults: OverlayOptions,
}

impl Session {
    pub fn new(config: &PerchConfig) -> Result<Self, ConfigError> {
        let host = HeadlessHost::new(config.viewport.width, config.viewport.height);
        let scheduler = Scheduler::with_config(
            host,
            SchedulerConfig {
                frame_interval: config.frame_interval()?,
            },
        );
        Ok(Self {
            scheduler,
            tips: BTreeMap::new(),
            defaults: config.defaults.clone(),
        })
    }

    pub fn scheduler(&self) -> &Scheduler<HeadlessHost> {
        &self.scheduler
    }

    pub fn host(&self) -> &HeadlessHost {
        self.scheduler.host()
    }

    pub fn tooltip(&self, name: &str) -> Option<&Tooltip<HeadlessHost>> {
        self.tips.get(name)
    }

    fn tip_mut(&mut self, name: &str) -> Result<&mut Tooltip<HeadlessHost>, CommandError> {
        self.tips
            .get_mut(name)
            .ok_or_else(|| CommandError::UnknownTooltip(name.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document
    // ─────────────────────────────────────────────────────────────────────────

    pub fn anchor(&mut self, name: &str, rect: Rect) -> Result<String, CommandError> {
        self.host().add_anchor(name, rect);
        Ok(describe_anchor(name, &rect))
    }

    pub fn move_anchor(&mut self, name: &str, rect: Rect) -> Result<String, CommandError> {
        self.host().move_anchor(name, rect)?;
        Ok(describe_anchor(name, &rect))
    }

    pub fn remove_anchor(&mut self, name: &str) -> Result<String, CommandError> {
        self.host().remove_anchor(name)?;
        Ok(format!("anchor {name} removed"))
    }

    pub fn scroll(&mut self, dx: f64, dy: f64) -> Result<String, CommandError> {
        self.host().scroll_by(dx, dy);
        self.scheduler.on_viewport_event(ViewportEvent::Scroll);
        Ok(self.describe_viewport())
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<String, CommandError> {
        self.host().resize(width, height);
        self.scheduler.on_viewport_event(ViewportEvent::Resize);
        Ok(self.describe_viewport())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tooltips
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create(&mut self, name: &str, args: TipArgs) -> Result<String, CommandError> {
        if self.tips.contains_key(name) {
            return Err(CommandError::DuplicateTooltip(name.to_string()));
        }

        let mut options = self.defaults.clone();
        if let Some(place) = args.place {
            options.place = place;
        }
        if args.spacing.is_some() {
            options.spacing = args.spacing;
        }
        options.auto |= args.auto;
        options.interactive |= args.interactive;
        if let Some(effect) = args.effect {
            if let Some(ms) = args.duration {
                self.host()
                    .set_class_style(&effect, "transition-duration", &format!("{ms}ms"));
            }
            options.effect_class = Some(effect);
        }

        let mut tip = Tooltip::new(&self.scheduler, options);
        if let Some(size) = args.size {
            tip.with_element(|e| e.set_fixed_size(size));
        }
        match args.text {
            Some(text) => tip.content(text),
            None => tip.update_size(),
        };

        let line = describe(name, &tip);
        self.tips.insert(name.to_string(), tip);
        Ok(line)
    }

    pub fn attach(&mut self, name: &str, anchor: &str) -> Result<String, CommandError> {
        if self.host().anchor(anchor).is_none() {
            return Err(PerchError::UnknownAnchor {
                name: anchor.to_string(),
            }
            .into());
        }
        let tip = self.tip_mut(name)?;
        tip.attach(anchor.to_string());
        Ok(describe(name, tip))
    }

    pub fn detach(&mut self, name: &str) -> Result<String, CommandError> {
        let tip = self.tip_mut(name)?;
        tip.detach();
        Ok(describe(name, tip))
    }

    pub fn show(&mut self, name: &str) -> Result<String, CommandError> {
        let tip = self.tip_mut(name)?;
        tip.show();
        Ok(describe(name, tip))
    }

    pub fn hide(&mut self, name: &str) -> Result<String, CommandError> {
        let tip = self.tip_mut(name)?;
        tip.hide();
        Ok(describe(name, tip))
    }

    pub fn toggle(&mut self, name: &str) -> Result<String, CommandError> {
        let tip = self.tip_mut(name)?;
        tip.toggle();
        Ok(describe(name, tip))
    }

    pub fn place(&mut self, name: &str, placement: &str) -> Result<String, CommandError> {
        let tip = self.tip_mut(name)?;
        tip.place_str(placement)?;
        Ok(describe(name, tip))
    }

    pub fn text(&mut self, name: &str, text: String) -> Result<String, CommandError> {
        let tip = self.tip_mut(name)?;
        tip.content(text);
        Ok(describe(name, tip))
    }

    pub fn at(&mut self, name: &str, x: f64, y: f64) -> Result<String, CommandError> {
        let tip = self.tip_mut(name)?;
        tip.position_at(x, y);
        Ok(describe(name, tip))
    }

    pub fn destroy(&mut self, name: &str) -> Result<String, CommandError> {
        let tip = self
            .tips
            .remove(name)
            .ok_or_else(|| CommandError::UnknownTooltip(name.to_string()))?;
        tip.destroy();
        Ok(format!("{name} destroyed"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scheduling
    // ─────────────────────────────────────────────────────────────────────────

    /// Let timers run: pending passes and hide transitions
    pub async fn wait(&mut self, duration: Duration) -> Result<String, CommandError> {
        tokio::time::sleep(duration).await;
        Ok(String::new())
    }

    pub fn flush(&mut self) -> Result<String, CommandError> {
        let repositioned = self.scheduler.flush();
        Ok(format!("repositioned {repositioned}"))
    }

    pub fn status(&self) -> Result<String, CommandError> {
        let mut lines = vec![self.describe_viewport()];

        let registered: Vec<String> = self
            .scheduler
            .registered()
            .iter()
            .map(|id| id.to_string())
            .collect();
        lines.push(format!(
            "scheduler: registered [{}] pending {} passes {}",
            registered.join(", "),
            self.scheduler.is_pending(),
            self.scheduler.passes()
        ));

        let host = self.host();
        for name in host.anchor_names() {
            if let Some(rect) = host.anchor(&name) {
                lines.push(describe_anchor(&name, &rect));
            }
        }
        for (name, tip) in &self.tips {
            lines.push(describe(name, tip));
        }
        Ok(lines.join("\n"))
    }

    fn describe_viewport(&self) -> String {
        let vp = self.host().viewport();
        format!(
            "viewport {} {} {}x{}",
            vp.top, vp.left, vp.width, vp.height
        )
    }
}

fn describe_anchor(name: &str, rect: &Rect) -> String {
    format!(
        "anchor {name} {} {} {}x{}",
        rect.top, rect.left, rect.width, rect.height
    )
}

/// One line summary: `name #id visibility WxH [placement top left] [@anchor]`
fn describe(name: &str, tip: &Tooltip<HeadlessHost>) -> String {
    let visibility = match tip.visibility() {
        Visibility::Hidden => "hidden",
        Visibility::Visible => "visible",
        Visibility::Hiding => "hiding",
    };
    let size = tip.size();
    let mut line = format!(
        "{name} {} {visibility} {}x{}",
        tip.id(),
        size.width,
        size.height
    );
    if let Some(position) = tip.last_position() {
        line.push_str(&format!(
            " {} {} {}",
            position.placement, position.top, position.left
        ));
    }
    if let Some(anchor) = tip.anchor() {
        line.push_str(&format!(" @{anchor}"));
    }
    line
}
