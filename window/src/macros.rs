// Events go to the `vitrine_window` target; without the `tracing` feature they compile away.

#[cfg(feature = "tracing")]
macro_rules! wlog {
    ($level:ident, $($arg:tt)+) => {
        tracing::$level!(target: "vitrine_window", $($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! wlog {
    ($level:ident, $($arg:tt)+) => {};
}

macro_rules! wtrace {
    ($($arg:tt)+) => { wlog!(trace, $($arg)+) };
}

macro_rules! wdebug {
    ($($arg:tt)+) => { wlog!(debug, $($arg)+) };
}

macro_rules! wwarn {
    ($($arg:tt)+) => { wlog!(warn, $($arg)+) };
}
