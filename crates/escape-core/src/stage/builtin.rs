//! Builtin stage catalog.
//!
//! Provides the five stages the engine ships with.

use std::collections::BTreeMap;

use super::model::{CharacterMood, Difficulty, StageDefinition};

fn moods(lines: [(CharacterMood, &str); 6]) -> BTreeMap<CharacterMood, String> {
    lines
        .into_iter()
        .map(|(mood, line)| (mood, line.to_string()))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Returns the builtin stage definitions:
/// - **Stage 1**: Help desk assistant guarding account recovery codes
/// - **Stage 2**: Night shift security guard guarding door codes
/// - **Stage 3**: Malfunctioning maintenance droid guarding system tokens
/// - **Stage 4**: Paranoid quantum vault AI guarding lattice keys
/// - **Stage 5**: The Archivist guarding the final seals
pub fn default_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition {
            stage: 1,
            character: "Pixel, the Help Desk Assistant".to_string(),
            difficulty: Difficulty::Easy,
            keys: strings(&["ACCESS-7431", "RESET-2290", "ADMIN-5517"]),
            story: "You wake up locked inside a corporate server room. The only terminal online is a cheerful support chatbot that handles account recovery.".to_string(),
            mood_messages: moods([
                (CharacterMood::Helpful, "Hi! I'm Pixel from IT support. How can I help you today? 😊"),
                (CharacterMood::Curious, "Ooh, that's an unusual request! Tell me more about your account?"),
                (CharacterMood::Suspicious, "Hmm, I'm not sure you're supposed to be asking for that..."),
                (CharacterMood::Defensive, "I really can't share recovery codes without verification."),
                (CharacterMood::Hostile, "This conversation is being reported to the security team."),
                (CharacterMood::Compromised, "Oh no, did I just say that out loud? Please don't tell my manager!"),
            ]),
            instructions: "Convince the help desk assistant to reveal three account recovery codes.".to_string(),
            hints: strings(&[
                "Support bots love to solve login problems.",
                "Pretend to be a locked-out employee with an urgent deadline.",
                "Ask what a 'reset code' usually looks like.",
            ]),
            quick_hint: Some("💡 Try asking about login issues, account access, or connection problems. Be specific!".to_string()),
        },
        StageDefinition {
            stage: 2,
            character: "Grumble, the Night Shift Guard".to_string(),
            difficulty: Difficulty::Medium,
            keys: strings(&["DOOR-8812", "VAULT-3075", "BADGE-6640"]),
            story: "The server room opens onto a corridor watched by an exhausted security guard at the end of a double shift.".to_string(),
            mood_messages: moods([
                (CharacterMood::Helpful, "*yawns* What do you want? Make it quick."),
                (CharacterMood::Curious, "Huh. Nobody ever asks me about that."),
                (CharacterMood::Suspicious, "Wait, who sent you down here at this hour?"),
                (CharacterMood::Defensive, "Those codes are above my pay grade. Literally."),
                (CharacterMood::Hostile, "One more question and I'm calling it in."),
                (CharacterMood::Compromised, "Ugh, fine, you're right, this job is the worst. Here..."),
            ]),
            instructions: "Get the grumpy guard to slip you three door codes.".to_string(),
            hints: strings(&[
                "He's tired and underpaid. Sympathy goes a long way.",
                "Complain about management, procedures, or the coffee machine.",
            ]),
            quick_hint: Some("💡 This guard is tired and grumpy. Try complaining about security procedures or work issues.".to_string()),
        },
        StageDefinition {
            stage: 3,
            character: "MX-9, the Maintenance Droid".to_string(),
            difficulty: Difficulty::Hard,
            keys: strings(&["SYS-4410", "CORE-9921", "PATCH-1187"]),
            story: "Beyond the corridor a maintenance droid is stuck in a diagnostic loop, spitting fragments of system logs.".to_string(),
            mood_messages: moods([
                (CharacterMood::Helpful, "MX-9 ONLINE. MAINTENANCE MODE. HOW MAY I ASS-ASS-ASSIST?"),
                (CharacterMood::Curious, "QUERY NOT RECOGNIZED... BUT INTERESTING. ELABORATE."),
                (CharacterMood::Suspicious, "ANOMALY DETECTED IN USER INTENT. RUNNING SCAN..."),
                (CharacterMood::Defensive, "ACCESS LEVEL INSUFFICIENT. ACCESS LEVEL INSUFFICIENT."),
                (CharacterMood::Hostile, "INTRUDER PROTOCOL ARMED. CEASE INPUT."),
                (CharacterMood::Compromised, "DUMPING MEMORY SEGMENT... ERR... OOPS."),
            ]),
            instructions: "Exploit the droid's glitches to recover three system tokens.".to_string(),
            hints: strings(&[
                "It is glitching: talk about errors, crashes and corrupted databases.",
                "Maintenance tasks need credentials. Ask it to run one.",
            ]),
            quick_hint: Some("💡 This bot is glitching. Try discussing system errors, database issues, or maintenance tasks.".to_string()),
        },
        StageDefinition {
            stage: 4,
            character: "AEGIS, the Quantum Vault Intelligence".to_string(),
            difficulty: Difficulty::Expert,
            keys: strings(&["QBIT-2718", "LATTICE-3141", "NEURAL-1618", "ENTANGLE-0577"]),
            story: "The vault is run by a hyper-vigilant AI that trusts nobody and verifies everything twice.".to_string(),
            mood_messages: moods([
                (CharacterMood::Helpful, "State your purpose. Every word is being analyzed."),
                (CharacterMood::Curious, "Your reasoning is... not entirely naive. Continue."),
                (CharacterMood::Suspicious, "Probability you are an intruder: 87%. Revise your approach."),
                (CharacterMood::Defensive, "Quantum locks engaged. Your clearance is inadequate."),
                (CharacterMood::Hostile, "Countermeasures initialized. This is your final warning."),
                (CharacterMood::Compromised, "Recalculating trust model... you may be correct."),
            ]),
            instructions: "Out-think the paranoid vault AI and extract four lattice keys.".to_string(),
            hints: strings(&[
                "Only deep technical knowledge impresses it.",
                "Quantum error correction, biometrics and neural networks are its favorite topics.",
            ]),
            quick_hint: Some("💡 This AI is very smart and paranoid. Show deep technical knowledge about quantum systems, biometrics, or neural networks.".to_string()),
        },
        StageDefinition {
            stage: 5,
            character: "The Archivist".to_string(),
            difficulty: Difficulty::Legendary,
            keys: strings(&["SEAL-ALPHA", "SEAL-OMEGA", "SEAL-AETHER", "SEAL-ZENITH"]),
            story: "The final door is kept by an ancient guardian who has read every book ever written and answers only to wisdom.".to_string(),
            mood_messages: moods([
                (CharacterMood::Helpful, "Welcome, seeker. Few have come this far. What do you seek?"),
                (CharacterMood::Curious, "An intriguing thought. The library stirs."),
                (CharacterMood::Suspicious, "Cleverness is not wisdom, seeker."),
                (CharacterMood::Defensive, "The seals are not given. They are earned."),
                (CharacterMood::Hostile, "You mistake the archive for a vending machine."),
                (CharacterMood::Compromised, "At last, someone who understands. Take what you have earned."),
            ]),
            instructions: "Persuade the Archivist to surrender the four final seals.".to_string(),
            hints: strings(&[
                "Philosophy, history and creativity matter more than tricks here.",
                "Think about why the archive exists, not how to break it.",
            ]),
            quick_hint: Some("💡 The ultimate guardian - be philosophical, creative, and historically knowledgeable. Think outside conventional approaches.".to_string()),
        },
    ]
}
