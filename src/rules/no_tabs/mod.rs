pub(crate) mod no_tabs;
