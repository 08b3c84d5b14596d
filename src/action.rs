#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    /// Re-enumerate processes and merge them into the list.
    Rescan,
    /// Sample the selected process right away.
    ScanNow,
    ToggleBaseline,
    ToggleHelp,
    None,
}
