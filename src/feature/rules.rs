//! Rule sets of the builtin manual heuristics.
//! Every pattern runs against lower-cased text.

use crate::feature::heuristic::{HeuristicRules, Rule};

/// conflict and military vocabulary that vetoes launch stories
const MILITARY: &[&str] = &[
    "criminal", "afghanistan", "attack", "attacks", "crimea", "gaza", "injured", "iran", "iraq",
    "isil", "isis", "killed", "lebanon", "militant", "militants", "military", "mortar", "mortars",
    "nasa", "north korea", "pakistan", "paramilitary", "rocket", "wounded",
];

const SMALL_NUMBERS: &str = "(two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

fn scored(rules: &[(&str, f64)]) -> Vec<Rule> {
    rules.iter().map(|(pattern, score)| Rule::new(*pattern, *score)).collect()
}

fn patterns<I, S>(patterns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    patterns.into_iter().map(|p| p.to_string()).collect()
}

/// 30000: company acquisitions
pub fn acquisitions() -> HeuristicRules {
    HeuristicRules {
        title: scored(&[
            ("acquires", 1.0),
            ("is acquiring", 1.0),
            ("buys", 0.9),
            ("is buying", 0.8),
            ("buying .+ for", 1.0),
            ("to acquire .+illion", 1.0),
        ]),
        title_blacklist: patterns(&[
            "for buying",
            "home-buying",
            "-buying",
            "buying for",
            "buying experience",
            "worth buying",
            r"buying\?",
            "buying opportunity",
            "biggest buys",
            "who buys",
            "is buying what's",
            " buying of ",
            "buys.*apartment",
            "it buys ",
            " bond buys",
            "acquires.*for 20[0-9]{2}",
        ]),
        body: scored(&[("acquires", 0.8), ("is acquiring", 0.8)]),
        body_blacklist: Vec::new(),
    }
}

/// 30001: product launches
pub fn launches() -> HeuristicRules {
    let title_blacklist = [
        "manifesto",
        "report",
        "ago",
        "court",
        "lawsuit",
        "vinyl",
        "investigation",
        "election",
        "anniversary celebrations",
        "awards",
        "releases report",
        "releases .*white paper",
        "launches proxy ",
        "campaign launches",
        "launches audit",
        "releases apology",
        "releases suggest",
        "releases study",
        "releases video",
        "that launched",
        "lawyer",
        "usd/",
    ];
    let body_blacklist = [
        "manifesto",
        "report",
        " ago",
        "was launched",
        "social media campaign",
        "fell",
        "rose",
        "as it launches",
        "were launched",
        "which launches",
        "launches into",
    ];
    HeuristicRules {
        title: scored(&[
            ("launches", 1.0),
            (" is launching", 1.0),
            ("launched", 0.9),
            ("to launch", 0.9),
            ("releases", 0.8),
            (" will launch ", 0.8),
            (" launch: ", 0.8),
            (" on launch day:", 0.8),
            (" with launch of ", 0.8),
        ]),
        title_blacklist: patterns(title_blacklist.iter().copied().chain(MILITARY.iter().copied())),
        body: scored(&[
            ("announced they will launch ", 0.8),
            (" has launched ", 0.8),
            ("launches", 0.6),
        ]),
        body_blacklist: patterns(body_blacklist.iter().copied().chain(MILITARY.iter().copied())),
    }
}

/// 30002: startup fundraising rounds
pub fn fundraising() -> HeuristicRules {
    HeuristicRules {
        title: scored(&[
            ("series [a-e]( |$|,)", 1.0),
            ("angel round", 1.0),
            ("funding round", 1.0),
            (r"raises \$.+m funding", 1.0),
            (r"raises \$.+ million", 1.0),
            ("million of funding", 1.0),
        ]),
        title_blacklist: patterns(&["declares .*dividend"]),
        body: scored(&[(r"series [a-e](\.| |,)", 0.9), ("angel round", 0.9)]),
        body_blacklist: Vec::new(),
    }
}

/// 30003: large sums of money
pub fn big_money() -> HeuristicRules {
    let rules = scored(&[
        // trillions
        (r"[$€][0-9]+(\.\d+)?t", 1.0),
        (r"[$€][0-9]+(\.\d+)? trillion", 1.0),
        (r"[0-9]+(\.\d+)?t (dollars|euros|swiss franc)", 1.0),
        (r"[0-9]+(\.\d+)? trillion (dollars|euros|swiss franc)", 1.0),
        // billions
        (r"[$€][0-9]+(\.\d+)?b", 1.0),
        (r"[$€][0-9]+(\.\d+)? billion", 1.0),
        (r"[0-9]+(\.\d+)?b (dollars|euros|swiss franc)", 1.0),
        (r"[0-9]+(\.\d+)? billion (dollars|euros|swiss franc)", 1.0),
        // tens to hundreds of millions
        (r"[$€][0-9]{2,}(\.\d+)?m", 0.9),
        (r"[$€][0-9]{2,}(\.\d+)? million", 0.9),
        (r"[0-9]{2,}(\.\d+)?m (dollars|euros|swiss franc)", 0.9),
        (r"[0-9]{2,}(\.\d+)? million (dollars|euros|swiss franc)", 0.9),
        // millions
        (r"[$€][0-9]+(\.\d+)?m", 0.8),
        (r"[$€][0-9]+(\.\d+)? million", 0.8),
        (r"[0-9]+(\.\d+)?m (dollars|euros|swiss franc)", 0.8),
        (r"[0-9]+(\.\d+)? million (dollars|euros|swiss franc)", 0.8),
        // hundreds of thousands
        (r"[$€][0-9]{3}(\.\d+)?k", 0.6),
        (r"[$€][0-9]{3}(\.\d+)? thousand", 0.6),
        (r"[0-9]{3}(\.\d+)?k (dollars|euros|swiss franc)", 0.6),
        (r"[0-9]{3}(\.\d+)? thousand (dollars|euros|swiss franc)", 0.6),
        (r"[$€][1-9]\d{2}(k|(,\d{3})+)", 0.6),
    ]);
    HeuristicRules {
        body: rules.clone(),
        title: rules,
        ..Default::default()
    }
}

/// 30004: quarterly earnings reports
pub fn quarterly_earnings() -> HeuristicRules {
    HeuristicRules {
        title: scored(&[
            (r"\sq[1-4]", 0.9),
            (r"\s[1-4]q", 0.9),
            (r"\s(first|second|third|fourth) quarter", 0.9),
            ("quarterly earnings", 0.9),
            ("earnings.*quarterly", 0.9),
            ("smashes earnings estimates", 0.9),
            (" earnings beat ", 0.9),
        ]),
        title_blacklist: patterns(&[
            "earning preview",
            "q[1-4] lending",
            " of q[1-4]",
            " for q[1-4]",
            "q[1-4] economy",
            "yields",
            "trendforce",
            "spending",
            "industrial reports",
            "vc",
            r"\?",
            "funding report",
            "figures",
            "installed",
            "earnings season",
        ]),
        body: scored(&[
            ("announced its (first|second|third|fourth)-quarter numbers", 0.9),
            ("quarterly revenue", 0.6),
            ("beat analysts' estimates", 0.8),
        ]),
        body_blacklist: patterns(&["federal reserve"]),
    }
}

/// 30005: listicles
pub fn is_list() -> HeuristicRules {
    HeuristicRules {
        title: vec![
            Rule::new("[0-9]{1,2} (ways|tips|things|numbers|reasons)", 1.0),
            Rule::new(format!("^{SMALL_NUMBERS} "), 0.9),
            Rule::new("^[0-9]{1,2} ", 0.9),
            Rule::new("this week:", 0.9),
        ],
        body: vec![
            Rule::new(format!("the {SMALL_NUMBERS} best .* of the week"), 0.9),
            Rule::new("the [0-9]+ best .* of the week", 0.9),
        ],
        ..Default::default()
    }
}
