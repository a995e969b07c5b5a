mod details;
mod legend;
mod panels;
mod toolbar;
