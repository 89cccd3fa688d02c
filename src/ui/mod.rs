/// egui wiring: sidebar controls, main panel and table widgets.
pub mod panels;
pub mod plot;
pub mod table;
