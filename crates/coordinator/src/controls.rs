use std::cell::RefCell;
use std::rc::Rc;

use flows::CountryDirectory;
use foundation::YearDomain;
use selection::{
    SelectionPatch, SelectionState, SelectionStore, SetOutcome, Subscription, WeakSelectionStore,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SliderBounds {
    pub min: i32,
    pub max: i32,
    pub value: i32,
}

/// What the passive selection controls display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSurface {
    /// Country search box contents.
    pub search_text: String,
    pub year_label: String,
    /// Unset until the dataset's years are known.
    pub slider: Option<SliderBounds>,
    pub flow_limit_label: &'static str,
    pub metric_label: &'static str,
}

impl ControlSurface {
    pub fn render(
        state: &SelectionState,
        directory: &CountryDirectory,
        years: Option<&YearDomain>,
    ) -> Self {
        let search_text = state
            .focus_country
            .map(|iso| {
                directory
                    .name_of(iso)
                    .map_or_else(|| iso.to_string(), str::to_string)
            })
            .unwrap_or_default();
        Self {
            search_text,
            year_label: state.focus_year.to_string(),
            slider: years.map(|d| SliderBounds {
                min: d.earliest(),
                max: d.latest(),
                value: state.focus_year,
            }),
            flow_limit_label: state.flow_limit.button_label(),
            metric_label: state.metric.as_str(),
        }
    }
}

struct ControlsInner {
    directory: CountryDirectory,
    surface: ControlSurface,
}

/// Search box, year slider and flow-limit button.
///
/// The surface is redrawn from every store notification and every user
/// action goes back through the store, so a control never updates another
/// control directly.
pub struct Controls {
    store: WeakSelectionStore,
    inner: Rc<RefCell<ControlsInner>>,
    _subscription: Subscription,
}

impl Controls {
    pub fn attach(store: &SelectionStore) -> Self {
        let directory = CountryDirectory::default();
        let surface =
            ControlSurface::render(&store.get(), &directory, store.year_domain().as_ref());
        let inner = Rc::new(RefCell::new(ControlsInner { directory, surface }));

        let weak = store.downgrade();
        let view = Rc::clone(&inner);
        let subscription = store.subscribe(move |state| {
            let years = weak.upgrade().and_then(|s| s.year_domain());
            let mut inner = view.borrow_mut();
            inner.surface = ControlSurface::render(state, &inner.directory, years.as_ref());
        });

        Self {
            store: store.downgrade(),
            inner,
            _subscription: subscription,
        }
    }

    /// Installs the country names once the dataset is known.
    pub fn set_directory(&self, directory: CountryDirectory) {
        let Some(store) = self.store.upgrade() else {
            return;
        };
        let mut inner = self.inner.borrow_mut();
        inner.surface =
            ControlSurface::render(&store.get(), &directory, store.year_domain().as_ref());
        inner.directory = directory;
    }

    pub fn surface(&self) -> ControlSurface {
        self.inner.borrow().surface.clone()
    }

    pub fn suggestions(&self, prefix: &str) -> Vec<String> {
        self.inner
            .borrow()
            .directory
            .suggest(prefix)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Picks a country from the search box; `None` if the text names none.
    pub fn submit_search(&self, text: &str) -> Option<SetOutcome> {
        let iso = self.inner.borrow().directory.resolve(text)?;
        let store = self.store.upgrade()?;
        Some(store.set(SelectionPatch::new().country(iso)))
    }

    /// Moves the year slider; years outside the dataset are ignored.
    pub fn slide_year(&self, year: i32) -> Option<SetOutcome> {
        let store = self.store.upgrade()?;
        if !store.year_domain().is_some_and(|d| d.contains(year)) {
            return None;
        }
        Some(store.set(SelectionPatch::new().year(year)))
    }

    pub fn toggle_flow_limit(&self) -> Option<SetOutcome> {
        let store = self.store.upgrade()?;
        let next = store.get().flow_limit.toggled();
        Some(store.set(SelectionPatch::new().flow_limit(next)))
    }
}
