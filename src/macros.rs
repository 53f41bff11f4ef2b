// Emits a tracing event at most once per `$ms` milliseconds for the given callsite.
// Events swallowed in between are reported in the `skipped_logs` field.
macro_rules! log_every_ms {
    ($ms:expr, $level:expr, $($rest:tt)*) => {{
        static LAST_RUN_MS: ::std::sync::atomic::AtomicU64 = ::std::sync::atomic::AtomicU64::new(0);
        static SKIPPED: ::std::sync::atomic::AtomicU64 = ::std::sync::atomic::AtomicU64::new(0);

        let now_ms = ::std::time::SystemTime::now()
            .duration_since(::std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let last = LAST_RUN_MS.load(::std::sync::atomic::Ordering::Relaxed);

        if now_ms.saturating_sub(last) >= $ms
            && LAST_RUN_MS
                .compare_exchange(
                    last,
                    now_ms,
                    ::std::sync::atomic::Ordering::Relaxed,
                    ::std::sync::atomic::Ordering::Relaxed,
                )
                .is_ok()
        {
            let skipped_logs = SKIPPED.swap(0, ::std::sync::atomic::Ordering::Relaxed);
            ::tracing::event!($level, skipped_logs, $($rest)*);
        } else {
            SKIPPED.fetch_add(1, ::std::sync::atomic::Ordering::Relaxed);
        }
    }};
}
