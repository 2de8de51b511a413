mod plot_layers;
mod styles;
mod ui_config;
mod ui_panels;
mod ui_plot_view;
mod ui_text;

pub(crate) use plot_layers::{
    CandlestickLayer, LayerContext, PlotLayer, PriceLineLayer, ReplayCutLayer,
};

pub(crate) use styles::{DirectionColor, UiStyleExt, get_outcome_color};

pub(crate) use ui_config::{UI_CONFIG, UI_TEXT};
pub use ui_plot_view::ChartView;
