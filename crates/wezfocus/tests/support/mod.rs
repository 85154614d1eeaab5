//! Shared helpers for capture and resolver integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::time::Duration;

use wezfocus_app::{CaptureSettings, ResolverSettings};
use wezfocus_core::TitleHeuristics;
use wezfocus_mux::{MuxError, MuxResult, Multiplexer, TabRecord};

pub const CLASS: &str = "org.wezfurlong.wezterm";

/// A call made against [`FakeMux`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCall {
    List,
    ActivateTab(u64),
    ActivatePane(u64, Option<String>),
}

/// Scripted multiplexer recording every call.
#[derive(Debug, Default)]
pub struct FakeMux {
    tabs: Vec<TabRecord>,
    fail_list: bool,
    fail_activate: bool,
    calls: RefCell<Vec<MuxCall>>,
}

impl FakeMux {
    pub fn with_tabs(tabs: Vec<TabRecord>) -> Self {
        Self {
            tabs,
            ..Self::default()
        }
    }

    /// Every call times out, as if the mux server were hung.
    pub fn hung() -> Self {
        Self {
            fail_list: true,
            fail_activate: true,
            ..Self::default()
        }
    }

    pub fn failing_activation(mut self) -> Self {
        self.fail_activate = true;
        self
    }

    pub fn calls(&self) -> Vec<MuxCall> {
        self.calls.borrow().clone()
    }

    fn timeout() -> MuxError {
        MuxError::Timeout {
            program: "wezterm".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Multiplexer for FakeMux {
    fn list_tabs(&self) -> MuxResult<Vec<TabRecord>> {
        self.calls.borrow_mut().push(MuxCall::List);
        if self.fail_list {
            return Err(Self::timeout());
        }
        Ok(self.tabs.clone())
    }

    fn activate_tab(&self, tab_id: u64) -> MuxResult<()> {
        self.calls.borrow_mut().push(MuxCall::ActivateTab(tab_id));
        if self.fail_activate {
            return Err(Self::timeout());
        }
        Ok(())
    }

    fn activate_pane(&self, pane_id: u64, socket: Option<&str>) -> MuxResult<()> {
        self.calls
            .borrow_mut()
            .push(MuxCall::ActivatePane(pane_id, socket.map(str::to_string)));
        if self.fail_activate {
            return Err(Self::timeout());
        }
        Ok(())
    }
}

pub struct TabBuilder(TabRecord);

/// Starts a tab record; one pane per tab unless `pane` says otherwise.
pub fn tab(window_id: u64, tab_id: u64) -> TabBuilder {
    TabBuilder(TabRecord {
        window_id,
        tab_id,
        pane_id: tab_id,
        workspace: "default".to_string(),
        title: String::new(),
        cwd: String::new(),
        window_title: String::new(),
        tab_title: String::new(),
        is_active: false,
    })
}

impl TabBuilder {
    pub fn pane(mut self, pane_id: u64) -> Self {
        self.0.pane_id = pane_id;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.0.title = title.to_string();
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.0.cwd = cwd.to_string();
        self
    }

    pub fn window_title(mut self, title: &str) -> Self {
        self.0.window_title = title.to_string();
        self
    }

    pub fn build(self) -> TabRecord {
        self.0
    }
}

pub fn resolver_settings() -> ResolverSettings {
    ResolverSettings {
        window_class: CLASS.to_string(),
        heuristics: TitleHeuristics::default(),
        settle: Duration::ZERO,
    }
}

pub fn capture_settings() -> CaptureSettings {
    CaptureSettings {
        window_class: CLASS.to_string(),
        heuristics: TitleHeuristics::default(),
    }
}
