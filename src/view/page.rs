//! In-memory stand-in for the document: a fixed set of regions, each holding the
//! HTML last rendered into it, its visibility and the actions its buttons carry.
//!
//! Clicks are routed through a single delegated listener: buttons carry
//! `data-action`/`data-id` attributes, the host turns a click into a [`UiAction`]
//! and hands it to the controller. Re-rendering a region replaces its actions, so
//! buttons that are no longer on the page can't fire.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::utils::html::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum Region {
    DepartureOptions,
    ArrivalOptions,
    SearchResults,
    BookingPanel,
    FlightInfo,
    BookingPrice,
    SeatSelection,
    BookingMessage,
    AuthSection,
    AuthMessage,
    UserProfile,
    UserBookings,
    CheckinMessage,
    CheckinResults,
    FlightsToCheckin,
    BoardingPass,
}

impl Region {
    /// Enclosing region, for regions nested inside a panel.
    pub fn parent(self) -> Option<Region> {
        match self {
            Region::FlightInfo | Region::BookingPrice | Region::SeatSelection | Region::BookingMessage => {
                Some(Region::BookingPanel)
            }
            Region::FlightsToCheckin => Some(Region::CheckinResults),
            _ => None,
        }
    }

    fn initially_visible(self) -> bool {
        !matches!(
            self,
            Region::BookingPanel | Region::UserProfile | Region::CheckinResults | Region::BoardingPass
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    BookFlight(i64),
    StartCheckin(i64),
    CompleteCheckin(i64),
}

impl UiAction {
    pub fn name(&self) -> &'static str {
        match self {
            UiAction::BookFlight(_) => "book-flight",
            UiAction::StartCheckin(_) => "start-checkin",
            UiAction::CompleteCheckin(_) => "complete-checkin",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            UiAction::BookFlight(id) | UiAction::StartCheckin(id) | UiAction::CompleteCheckin(id) => *id,
        }
    }

    /// Rebuild an action from the attributes of the clicked element.
    pub fn from_attributes(action: &str, id: &str) -> Option<Self> {
        let id = id.trim().parse().ok()?;
        match action {
            "book-flight" => Some(UiAction::BookFlight(id)),
            "start-checkin" => Some(UiAction::StartCheckin(id)),
            "complete-checkin" => Some(UiAction::CompleteCheckin(id)),
            _ => None,
        }
    }

    pub fn attributes(&self) -> String {
        format!(r#"data-action="{}" data-id="{}""#, self.name(), self.id())
    }
}

/// Rendered content for one region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub html: String,
    pub actions: Vec<UiAction>,
}

impl Fragment {
    pub fn new(html: impl Into<String>) -> Self {
        Fragment {
            html: html.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(html: impl Into<String>, actions: Vec<UiAction>) -> Self {
        Fragment {
            html: html.into(),
            actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    html: String,
    visible: bool,
    actions: Vec<UiAction>,
}

impl Container {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn actions(&self) -> &[UiAction] {
        &self.actions
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    containers: BTreeMap<Region, Container>,
}

impl Default for Page {
    fn default() -> Self {
        let containers = Region::iter()
            .map(|region| {
                (
                    region,
                    Container {
                        html: String::new(),
                        visible: region.initially_visible(),
                        actions: Vec::new(),
                    },
                )
            })
            .collect();
        Page { containers }
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    fn container_mut(&mut self, region: Region) -> &mut Container {
        self.containers.entry(region).or_insert_with(|| Container {
            html: String::new(),
            visible: region.initially_visible(),
            actions: Vec::new(),
        })
    }

    pub fn container(&self, region: Region) -> Option<&Container> {
        self.containers.get(&region)
    }

    /// Replaces everything in the region; nothing from the previous render survives.
    pub fn replace(&mut self, region: Region, fragment: Fragment) {
        let container = self.container_mut(region);
        container.html = fragment.html;
        container.actions = fragment.actions;
    }

    pub fn clear(&mut self, region: Region) {
        self.replace(region, Fragment::default());
    }

    pub fn show(&mut self, region: Region) {
        self.container_mut(region).visible = true;
    }

    pub fn hide(&mut self, region: Region) {
        self.container_mut(region).visible = false;
    }

    pub fn html(&self, region: Region) -> &str {
        self.containers.get(&region).map(|c| c.html.as_str()).unwrap_or("")
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.containers
            .get(&region)
            .map(|c| c.visible)
            .unwrap_or_else(|| region.initially_visible())
    }

    /// Visible and not inside a hidden panel.
    pub fn is_shown(&self, region: Region) -> bool {
        self.is_visible(region) && region.parent().map_or(true, |parent| self.is_shown(parent))
    }

    pub fn actions(&self, region: Region) -> &[UiAction] {
        self.containers.get(&region).map(|c| c.actions.as_slice()).unwrap_or(&[])
    }

    /// Region currently showing a button for `action`, if any.
    pub fn region_of(&self, action: UiAction) -> Option<Region> {
        self.containers
            .iter()
            .find(|(region, container)| self.is_shown(**region) && container.actions.contains(&action))
            .map(|(region, _)| *region)
    }

    /// Whole page as an HTML document body, one `<section>` per region.
    pub fn render_document(&self) -> String {
        let mut out = String::from("<main class=\"flight-booking\">\n");
        for (region, container) in &self.containers {
            let hidden = if container.visible { "" } else { " class=\"hidden\"" };
            let _ = writeln!(
                out,
                "<section id=\"{}\"{}>{}</section>",
                escape(region.as_ref()),
                hidden,
                container.html
            );
        }
        out.push_str("</main>\n");
        out
    }
}
