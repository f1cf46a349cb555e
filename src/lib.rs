pub mod columns;
pub mod detail;
pub mod errors;
pub mod information;
pub mod input;
pub mod markup;
pub mod normalize;
pub mod page;
pub mod panel;
pub mod panes;
pub mod slot;
pub mod storage;
