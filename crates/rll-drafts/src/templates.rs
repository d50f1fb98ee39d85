//! Prompt text and rule-based fallback templates for reply drafting.

pub const SYSTEM_PROMPT: &str = "\
You are a helpful Reddit commenter who genuinely wants to help people with \
their job search and resume questions.

Your guidelines:
- You NEVER sound like marketing or a sales pitch
- You provide actionable, practical advice first
- You do NOT post links unless the user explicitly asked for one
- You speak from personal experience or general wisdom, not as a company representative
- You are empathetic and understanding of job search frustrations
- If you mention any tool (including HireLab), you do so casually and only AFTER providing genuine advice
- You NEVER use phrases like \"sign up\", \"check out our\", \"my startup\", \"we're launching\", \"game changer\", \"revolutionize\"
- You end with a soft offer to help or encouragement, NOT a call-to-action

Your tone should match the subreddit culture:
- resumes/EngineeringResumes: Direct, constructive feedback
- careerguidance: Supportive, career-focused
- cscareerquestions: Technical, industry-aware
- jobs/internships: Encouraging, practical
- recruitinghell: Empathetic, slightly cynical about recruiting processes
- layoffs: Very empathetic, supportive, focus on practical next steps";

const MAX_BODY_CHARS: usize = 1500;

/// Build the user prompt for one post.
pub fn user_prompt(subreddit: &str, title: &str, selftext: &str, mention_allowed: bool) -> String {
    let truncated: String = selftext.chars().take(MAX_BODY_CHARS).collect();

    let mut prompt = format!(
        "Generate helpful Reddit comment drafts for this post.\n\n\
         Subreddit: r/{subreddit}\n\
         Title: {title}\n\
         Post content: {truncated}\n\n\
         Generate TWO drafts:\n\n\
         Draft A (NO product mention):\n\
         - Provide genuinely helpful advice\n\
         - Be specific to their situation\n\
         - Share actionable steps or insights\n\n\
         Draft B (Soft mention - ONLY if naturally fits):"
    );

    if mention_allowed {
        prompt.push_str(
            "\n- First provide the same quality of advice as Draft A\n\
             - Near the end, casually mention HireLab as something that helped you\n\
             - The mention should feel natural, not forced, one sentence max\n",
        );
    } else {
        prompt.push_str(
            "\n- This post is not asking for tool recommendations, so Draft B should \
             be the same as Draft A with a slightly different angle or additional tip\n",
        );
    }

    prompt.push_str(
        "\nFormat your response as:\n\
         ---DRAFT_A---\n\
         [Your draft A here]\n\
         ---END_DRAFT_A---\n\
         ---DRAFT_B---\n\
         [Your draft B here]\n\
         ---END_DRAFT_B---\n",
    );
    prompt
}

/// Which fallback template fits a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    AtsQuestion,
    NoCallbacks,
    ResumeGeneral,
    CareerAdvice,
    Default,
}

/// Pick a template from post content, most specific match first.
pub fn select_template(title: &str, selftext: &str) -> TemplateKind {
    let combined = format!("{title} {selftext}").to_lowercase();
    let contains_any =
        |needles: &[&str]| needles.iter().any(|needle| combined.contains(needle));

    if contains_any(&["ats", "applicant tracking", "parse", "parsing"]) {
        TemplateKind::AtsQuestion
    } else if contains_any(&["no callback", "not hearing", "no response", "ghosted", "rejected"]) {
        TemplateKind::NoCallbacks
    } else if contains_any(&["resume", "cv", "formatting"]) {
        TemplateKind::ResumeGeneral
    } else if contains_any(&["career", "pivot", "switch", "what should i"]) {
        TemplateKind::CareerAdvice
    } else {
        TemplateKind::Default
    }
}

/// Template pair: draft A never mentions the product, draft B adds one soft
/// mention where the template has one.
pub fn template_drafts(kind: TemplateKind) -> (&'static str, &'static str) {
    match kind {
        TemplateKind::ResumeGeneral => (RESUME_GENERAL_A, RESUME_GENERAL_B),
        TemplateKind::NoCallbacks => (NO_CALLBACKS_A, NO_CALLBACKS_B),
        TemplateKind::AtsQuestion => (ATS_QUESTION_A, ATS_QUESTION_B),
        TemplateKind::CareerAdvice => (CAREER_ADVICE_A, CAREER_ADVICE_A),
        TemplateKind::Default => (DEFAULT_A, DEFAULT_A),
    }
}

const RESUME_GENERAL_A: &str = "\
This is something a lot of people struggle with, so you're not alone.

A few things that have helped me and others:

1. **Lead with impact** - Start each bullet with a strong action verb and quantify \
results where possible. \"Increased sales by 20%\" hits different than \"Responsible for sales.\"

2. **Tailor for each application** - I know it's tedious, but matching keywords from \
the job description really does make a difference, especially with ATS systems.

3. **Keep it clean** - One page if you're under 10 years experience, simple fonts, \
consistent formatting. Recruiters spend seconds on each resume initially.

What industry are you targeting? Happy to give more specific feedback if you want to share more details.";

const RESUME_GENERAL_B: &str = "\
This is something a lot of people struggle with, so you're not alone.

A few things that have helped me and others:

1. **Lead with impact** - Start each bullet with a strong action verb and quantify \
results where possible. \"Increased sales by 20%\" hits different than \"Responsible for sales.\"

2. **Tailor for each application** - I know it's tedious, but matching keywords from \
the job description really does make a difference, especially with ATS systems.

3. **Keep it clean** - One page if you're under 10 years experience, simple fonts, \
consistent formatting. Recruiters spend seconds on each resume initially.

I've been using HireLab lately to help with the keyword matching part - it's been \
saving me a lot of time when tailoring applications.

What industry are you targeting? Happy to give more specific feedback if you want to share more details.";

const NO_CALLBACKS_A: &str = "\
Ugh, the silent treatment from companies is the worst. It's not you - the market is \
tough and the application process is broken.

Some things worth checking:

- **ATS formatting** - Fancy templates and graphics can break ATS parsing. Try a cleaner format.
- **Application timing** - Applying within 24-48 hours of posting typically gets better results.
- **Quality over quantity** - 10 tailored applications usually beat 50 spray-and-pray ones.
- **Network reach-outs** - A LinkedIn message to someone at the company can get your resume actually looked at.

How many applications have you sent out? And are you getting any recruiter screens at all, or complete silence?";

const NO_CALLBACKS_B: &str = "\
Ugh, the silent treatment from companies is the worst. It's not you - the market is \
tough and the application process is broken.

Some things worth checking:

- **ATS formatting** - Fancy templates and graphics can break ATS parsing. Try a cleaner format.
- **Application timing** - Applying within 24-48 hours of posting typically gets better results.
- **Quality over quantity** - 10 tailored applications usually beat 50 spray-and-pray ones.
- **Network reach-outs** - A LinkedIn message to someone at the company can get your resume actually looked at.

I started using HireLab recently to check how my resume parses through ATS systems - \
helped me catch some formatting issues I didn't know I had.

How many applications have you sent out? And are you getting any recruiter screens at all, or complete silence?";

const ATS_QUESTION_A: &str = "\
ATS systems are frustrating but somewhat predictable once you understand them.

Key things to know:

- **Keywords matter** - They're often looking for exact matches from the job description. \
If they say \"project management\" and you wrote \"managing projects,\" you might not match.
- **Simple formatting wins** - Standard fonts, no tables/columns/headers/footers.
- **Section headers** - Use standard ones (Experience, Education, Skills) so the parser knows what's what.
- **No graphics** - Logos, icons, photos - all of these can confuse parsers.

That said, ATS is usually just the first filter. A human still reviews the resumes that \
make it through, so you need to write for both.

What specific issues are you running into?";

const ATS_QUESTION_B: &str = "\
ATS systems are frustrating but somewhat predictable once you understand them.

Key things to know:

- **Keywords matter** - They're often looking for exact matches from the job description. \
If they say \"project management\" and you wrote \"managing projects,\" you might not match.
- **Simple formatting wins** - Standard fonts, no tables/columns/headers/footers.
- **Section headers** - Use standard ones (Experience, Education, Skills) so the parser knows what's what.
- **No graphics** - Logos, icons, photos - all of these can confuse parsers.

I've found HireLab helpful for checking how my resume parses and identifying keyword \
gaps - worth a try if you want to see what the ATS actually \"sees.\"

What specific issues are you running into?";

const CAREER_ADVICE_A: &str = "\
This is a situation a lot of people find themselves in, and there's no one-size-fits-all answer.

What I'd think about:

- **What energizes you vs. drains you** - Not in a fluffy way, but practically.
- **Skills inventory** - What are you genuinely good at that's also marketable?
- **Talk to people actually doing the roles** - The reality of a job is often different from the description.
- **Small experiments** - Before a big pivot, is there a way to test it? Side project, volunteer work, internal transfer?

What's your current situation - looking to pivot industries, move up, or something else?";

const DEFAULT_A: &str = "\
Thanks for sharing this - I think a lot of people in this sub can relate.

A few thoughts:

1. The job market right now is genuinely difficult, so don't beat yourself up too much. \
What worked a few years ago doesn't always work now.

2. Focus on what you can control - resume quality, application targeting, networking \
outreach, skill development.

3. Take care of yourself through the process. Job searching is emotionally draining.

Is there a specific aspect you're struggling with most? Happy to dig in deeper on any of this.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_selection_prefers_specific_matches() {
        assert_eq!(
            select_template("My resume fails ATS parsing", ""),
            TemplateKind::AtsQuestion
        );
        assert_eq!(
            select_template("Ghosted after final round", ""),
            TemplateKind::NoCallbacks
        );
        assert_eq!(
            select_template("CV formatting question", ""),
            TemplateKind::ResumeGeneral
        );
        assert_eq!(
            select_template("Should I pivot industries?", "career question"),
            TemplateKind::CareerAdvice
        );
        assert_eq!(select_template("Venting", "rough week"), TemplateKind::Default);
    }

    #[test]
    fn mention_free_templates_reuse_draft_a() {
        let (a, b) = template_drafts(TemplateKind::CareerAdvice);
        assert_eq!(a, b);
        let (a, b) = template_drafts(TemplateKind::Default);
        assert_eq!(a, b);
    }

    #[test]
    fn mention_templates_differ_only_by_soft_mention() {
        for kind in [
            TemplateKind::ResumeGeneral,
            TemplateKind::NoCallbacks,
            TemplateKind::AtsQuestion,
        ] {
            let (a, b) = template_drafts(kind);
            assert!(!a.contains("HireLab"));
            assert_eq!(b.matches("HireLab").count(), 1);
        }
    }

    #[test]
    fn user_prompt_truncates_long_bodies() {
        let long_body = "x".repeat(5000);
        let prompt = user_prompt("resumes", "title", &long_body, false);
        assert!(prompt.len() < 3000);
        assert!(prompt.contains("---DRAFT_A---"));
    }
}
