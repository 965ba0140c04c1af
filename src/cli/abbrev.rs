// Command abbreviation matching for the phasemap CLI

/// Find all commands that start with the given prefix (case-insensitive)
pub fn find_matching_commands<'a>(prefix: &str, commands: &'a [&str]) -> Vec<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    commands.iter()
        .filter(|cmd| cmd.to_lowercase().starts_with(&prefix_lower))
        .copied()
        .collect()
}

/// Find a unique command match for the given prefix
/// Returns Ok(command) if exactly one match, Err(matches) if ambiguous, Err(empty) if no match
/// Exact matches take precedence over prefix matches
pub fn find_unique_command<'a>(
    prefix: &str,
    commands: &'a [&str],
) -> Result<&'a str, Vec<&'a str>> {
    let prefix_lower = prefix.to_lowercase();
    if let Some(cmd) = commands.iter().find(|cmd| cmd.to_lowercase() == prefix_lower) {
        return Ok(*cmd);
    }

    let matches = find_matching_commands(prefix, commands);
    if matches.len() == 1 {
        Ok(matches[0])
    } else {
        Err(matches)
    }
}

/// Top-level commands
pub const TOP_LEVEL_COMMANDS: &[&str] = &[
    "phases", "report", "color", "show", "config", "help"
];

/// Global options that take a value (the value is not a command)
const VALUE_OPTIONS: &[&str] = &["--phases", "--policy", "--pid-field"];

/// Expand an abbreviated command name (`rep` -> `report`).
/// Only the first positional argument is considered; everything else passes through.
pub fn expand_command_abbreviations(args: Vec<String>) -> Result<Vec<String>, String> {
    let mut expanded = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    let mut skip_value = false;

    while let Some(arg) = iter.next() {
        if skip_value {
            skip_value = false;
            expanded.push(arg);
            continue;
        }
        if arg.starts_with('-') {
            skip_value = VALUE_OPTIONS.contains(&arg.as_str());
            expanded.push(arg);
            continue;
        }

        match find_unique_command(&arg, TOP_LEVEL_COMMANDS) {
            Ok(full_cmd) => expanded.push(full_cmd.to_string()),
            Err(matches) if matches.is_empty() => expanded.push(arg),
            Err(matches) => {
                return Err(format!(
                    "Ambiguous command '{}'. Did you mean one of: {}?",
                    arg,
                    matches.join(", ")
                ));
            }
        }
        expanded.extend(iter.by_ref());
        break;
    }

    Ok(expanded)
}
