/// Returns the usage guide for scripts and agents driving shelfwise.
pub fn run() -> &'static str {
    r#"## sw preparation

sw tracks a personal book collection, a reading goal and goal streaks. Data lives in a
.shelfwise/ directory found by walking up from the current directory (or SHELFWISE_DIR).

### Setup

```bash
sw init              # Initialize in current directory
sw init --stealth    # Initialize without committing .shelfwise to the repo
```

Every command accepts `--owner <id>` (or SHELFWISE_OWNER) to pick whose collection to use.

### Books

```bash
sw book add "Dune" --author "Frank Herbert" --genre SF --pages 412
sw book add "Emma" --author "Jane Austen" --finished-at 2024-05-01T20:00:00Z
sw book list                       # Current collection
sw book list --deleted             # Recently deleted books
sw book search herbert             # Title, author or genre
sw book update <book_id> --rating 4.5
sw book finish <book_id>           # Finished now (or --at <timestamp>)
sw book delete <book_id>
sw book restore <book_id>
sw book purge                      # Drop books deleted over 30 days ago (--days N)
```

Adding a title that was deleted restores the old entry.

### Goals

```bash
sw settings set --interval weekly  # daily, weekly, monthly or yearly
sw goal set 2                      # Books per interval
sw goal show
```

Finishing a book records a goal interval automatically: the books finished between the start of
the current interval and the end of that day are counted against the reading goal.

Intervals can also be recorded directly:

```bash
sw goal record --interval daily --target 1 --achieved 2 \
  --start 2024-05-01T00:00:00Z --end 2024-05-01T23:59:59Z
```

### Streaks

```bash
sw goal history    # Recorded intervals, oldest first
sw goal stats      # Current/longest streak, completion rate, best interval
```

Add `--json` to list and show commands for machine-readable output."#
}
