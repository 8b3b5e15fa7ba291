//! Search widget state machine
//!
//! Collapsed -> Expanded -> (ShowingSuggestions | ShowingQuickLinks) -> Collapsed
//!
//! The widget is re-enterable: closing it in any way clears the query and
//! returns to `Collapsed`.

use super::{resolve_query, Navigation, QuickLink, QUICK_LINKS};
use crate::indexer::DirectLinks;
use crate::ranker::MatchResult;
use crate::session::SearchSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Collapsed,
    Expanded,
    ShowingSuggestions,
    ShowingQuickLinks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The search icon was clicked
    Activate,
    /// The input now holds this text
    Input(String),
    /// Enter or form submit
    Submit,
    Escape,
    OutsideClick,
    Close,
    PickResult(usize),
    PickQuickLink(usize),
}

/// What the widget currently displays
#[derive(Debug, PartialEq)]
pub enum WidgetView<'a> {
    Hidden,
    Suggestions(&'a [MatchResult]),
    QuickLinks(&'static [QuickLink]),
}

pub struct SearchWidget {
    session: SearchSession,
    direct_links: DirectLinks,
    confident_cutoff: f64,
    state: WidgetState,
}

impl SearchWidget {
    pub fn new(session: SearchSession, direct_links: DirectLinks, confident_cutoff: f64) -> Self {
        Self {
            session,
            direct_links,
            confident_cutoff,
            state: WidgetState::Collapsed,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SearchSession {
        &mut self.session
    }

    /// Apply an event, returning where to navigate if it triggered navigation
    pub fn handle(&mut self, event: WidgetEvent) -> Option<Navigation> {
        use WidgetState::*;

        match (self.state, event) {
            (Collapsed, WidgetEvent::Activate) => {
                self.state = Expanded;
                None
            }
            (Collapsed, _) => None,

            (_, WidgetEvent::Activate)
            | (_, WidgetEvent::Escape)
            | (_, WidgetEvent::OutsideClick)
            | (_, WidgetEvent::Close) => {
                self.collapse();
                None
            }

            (_, WidgetEvent::Input(text)) => {
                self.session.set_query(text);
                self.state = self.settled_state();
                None
            }

            (_, WidgetEvent::Submit) => {
                let nav = resolve_query(
                    self.session.query(),
                    &self.direct_links,
                    self.session.results(),
                    self.confident_cutoff,
                )?;
                self.collapse();
                Some(nav)
            }

            (ShowingSuggestions, WidgetEvent::PickResult(i)) => {
                let path = self.session.results().get(i)?.item.path.clone();
                self.collapse();
                Some(Navigation::Document(path))
            }

            (Expanded | ShowingQuickLinks, WidgetEvent::PickQuickLink(i)) => {
                let link = QUICK_LINKS.get(i)?;
                self.collapse();
                Some(Navigation::DirectLink(link.path.to_string()))
            }

            (_, WidgetEvent::PickResult(_) | WidgetEvent::PickQuickLink(_)) => None,
        }
    }

    /// Re-evaluate the display after the session installed a new index
    pub fn refresh(&mut self) {
        if matches!(
            self.state,
            WidgetState::ShowingSuggestions | WidgetState::ShowingQuickLinks
        ) {
            self.state = self.settled_state();
        }
    }

    pub fn view(&self) -> WidgetView<'_> {
        match self.state {
            WidgetState::Collapsed => WidgetView::Hidden,
            WidgetState::ShowingSuggestions => WidgetView::Suggestions(self.session.results()),
            WidgetState::Expanded | WidgetState::ShowingQuickLinks => {
                WidgetView::QuickLinks(&QUICK_LINKS)
            }
        }
    }

    fn settled_state(&self) -> WidgetState {
        let min_len = self.session.ranker().config().min_query_len;
        if self.session.query().chars().count() >= min_len && !self.session.results().is_empty() {
            WidgetState::ShowingSuggestions
        } else {
            WidgetState::ShowingQuickLinks
        }
    }

    fn collapse(&mut self) {
        self.session.clear();
        self.state = WidgetState::Collapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{build_index, Article, PageTitles};
    use crate::presenter::CONFIDENT_CUTOFF;
    use crate::ranker::FuzzyRanker;

    fn widget() -> SearchWidget {
        let links: DirectLinks = [("archivio", "/archive"), ("contatti", "/contact")]
            .into_iter()
            .collect();
        let titles = PageTitles::from([
            ("/archive".to_string(), "Archive".to_string()),
            ("/contact".to_string(), "Contact".to_string()),
        ]);
        let articles = vec![
            Article::new("Bitcoin Outlook 2024", "/article/btc-2024").with_category("Crypto"),
            Article::new("Bonds for beginners", "/article/bonds"),
        ];
        let index = build_index(&links, &titles, &articles);
        let session = SearchSession::from_index(index, FuzzyRanker::default());
        SearchWidget::new(session, links, CONFIDENT_CUTOFF)
    }

    fn input(text: &str) -> WidgetEvent {
        WidgetEvent::Input(text.to_string())
    }

    #[test]
    fn test_starts_collapsed_and_ignores_input() {
        let mut w = widget();
        assert_eq!(w.state(), WidgetState::Collapsed);
        assert_eq!(w.view(), WidgetView::Hidden);

        assert_eq!(w.handle(input("bitcoin")), None);
        assert_eq!(w.handle(WidgetEvent::Submit), None);
        assert_eq!(w.state(), WidgetState::Collapsed);
        assert_eq!(w.session().query(), "");
    }

    #[test]
    fn test_typing_switches_between_suggestions_and_quick_links() {
        let mut w = widget();
        w.handle(WidgetEvent::Activate);
        assert_eq!(w.state(), WidgetState::Expanded);
        assert_eq!(w.view(), WidgetView::QuickLinks(&QUICK_LINKS));

        w.handle(input("b"));
        assert_eq!(w.state(), WidgetState::ShowingQuickLinks);

        w.handle(input("bitcoin"));
        assert_eq!(w.state(), WidgetState::ShowingSuggestions);
        match w.view() {
            WidgetView::Suggestions(results) => {
                assert_eq!(results[0].item.path, "/article/btc-2024")
            }
            other => panic!("unexpected view {other:?}"),
        }

        w.handle(input("zzzzz"));
        assert_eq!(w.state(), WidgetState::ShowingQuickLinks);
    }

    #[test]
    fn test_escape_and_outside_click_collapse() {
        for event in [
            WidgetEvent::Escape,
            WidgetEvent::OutsideClick,
            WidgetEvent::Close,
            WidgetEvent::Activate,
        ] {
            let mut w = widget();
            w.handle(WidgetEvent::Activate);
            w.handle(input("bonds"));
            assert_eq!(w.handle(event), None);
            assert_eq!(w.state(), WidgetState::Collapsed);
            assert_eq!(w.session().query(), "");
            assert!(w.session().results().is_empty());
        }
    }

    #[test]
    fn test_submit_resolves_and_collapses() {
        let mut w = widget();
        w.handle(WidgetEvent::Activate);
        w.handle(input("Contatti "));
        assert_eq!(
            w.handle(WidgetEvent::Submit),
            Some(Navigation::DirectLink("/contact".to_string()))
        );
        assert_eq!(w.state(), WidgetState::Collapsed);

        // cyclic: the widget opens again
        w.handle(WidgetEvent::Activate);
        w.handle(input("zzzzz"));
        assert_eq!(
            w.handle(WidgetEvent::Submit),
            Some(Navigation::SearchPage("/search?q=zzzzz".to_string()))
        );
        assert_eq!(w.session().query(), "");
    }

    #[test]
    fn test_blank_submit_keeps_widget_open() {
        let mut w = widget();
        w.handle(WidgetEvent::Activate);
        w.handle(input("  "));
        assert_eq!(w.handle(WidgetEvent::Submit), None);
        assert_eq!(w.state(), WidgetState::ShowingQuickLinks);
    }

    #[test]
    fn test_picking_entries() {
        let mut w = widget();
        w.handle(WidgetEvent::Activate);
        assert_eq!(
            w.handle(WidgetEvent::PickQuickLink(4)),
            Some(Navigation::DirectLink("/donate".to_string()))
        );

        w.handle(WidgetEvent::Activate);
        w.handle(input("bonds"));
        assert_eq!(w.handle(WidgetEvent::PickResult(9)), None);
        assert_eq!(w.handle(WidgetEvent::PickQuickLink(0)), None);
        assert_eq!(
            w.handle(WidgetEvent::PickResult(0)),
            Some(Navigation::Document("/article/bonds".to_string()))
        );
        assert_eq!(w.state(), WidgetState::Collapsed);
    }
}
