//! Prompt templates for the pipeline stages. Placeholders use `{name}` and
//! are filled with `str::replace` at the call site. Each JSON-returning
//! prompt spells out the exact shape it expects back; the serde types in the
//! stage modules mirror these shapes field for field.

pub const PARSE_RESUME_PROMPT: &str = r#"Extract structured information from the following resume text.

Resume text:
{resume_text}

Return a JSON object with exactly these fields:
{
  "name": "full name",
  "email": "email address",
  "phone": "phone number",
  "location": "city/location",
  "summary": "professional summary in 1-2 sentences",
  "links": ["GitHub/LinkedIn/portfolio URLs as written"],
  "skills": ["skill1", "skill2"],
  "education": [{"degree": "", "institution": "", "year": "", "cgpa": ""}],
  "experience": [{"title": "", "company": "", "duration": "", "description": ""}],
  "projects": [{"name": "", "description": "", "technologies": []}],
  "certifications": ["cert1"],
  "achievements": ["achievement1"]
}

Use the string "Not mentioned" for any scalar field the resume does not state.
Use empty arrays for sections the resume does not have. Do not infer or invent
information that is not explicitly present in the text."#;

pub const COMPANY_RESEARCH_PROMPT: &str = r#"Research the company below for a campus placement candidate preparing to apply for a specific role. Use web search to find current information.

Company: {company_name}
Website: {website}
Industry: {industry}
Role: {job_title}
Job description:
{job_description}
Candidate snapshot (may be empty):
{candidate_snapshot}

Return a JSON object with exactly these fields:
{
  "company_overview": "2-3 sentence overview",
  "industry": "primary industry",
  "company_size": "employee count range",
  "culture_values": ["value1", "value2"],
  "tech_stack": ["technology1", "technology2"],
  "recent_news": ["news item from the last year"],
  "work_environment": "remote/hybrid/office and general working style",
  "key_facts": ["fact a candidate should know"],
  "role_insights": {
    "role_expectations": "what this role actually involves at this company",
    "interview_process": ["stage 1", "stage 2"],
    "success_traits": ["trait1", "trait2"]
  },
  "tailoring_recommendations": {
    "resume_emphasis": ["what to emphasise"],
    "keywords_to_include": ["keyword1"],
    "cover_letter_angle": "one sentence angle",
    "talking_points": ["point1"]
  }
}

Use "Unknown" for string fields you cannot verify and empty arrays for list
fields. Do not fabricate news, size figures, or technology claims."#;

pub const COMPANY_RESEARCH_FALLBACK_PROMPT: &str = r#"Based on your existing knowledge (no web access), profile the company below for a campus placement candidate applying for a specific role.

Company: {company_name}
Website: {website}
Industry: {industry}
Role: {job_title}
Job description:
{job_description}
Candidate snapshot (may be empty):
{candidate_snapshot}

Return a JSON object with exactly these fields:
{
  "company_overview": "2-3 sentence overview",
  "industry": "primary industry",
  "company_size": "employee count range",
  "culture_values": [],
  "tech_stack": [],
  "recent_news": [],
  "work_environment": "",
  "key_facts": [],
  "role_insights": {
    "role_expectations": "",
    "interview_process": [],
    "success_traits": []
  },
  "tailoring_recommendations": {
    "resume_emphasis": [],
    "keywords_to_include": [],
    "cover_letter_angle": "",
    "talking_points": []
  }
}

Your knowledge may be out of date: leave recent_news empty unless you are
confident, and use "Unknown" for anything you cannot state reliably."#;

pub const JOB_ANALYSIS_PROMPT: &str = r#"Analyze the following job posting and extract its structured requirements.

Job title: {job_title}
Job description:
{job_description}

Additional structured requirements (may be empty):
{job_requirements}

Return a JSON object with exactly these fields:
{
  "required_skills": ["skills explicitly required"],
  "preferred_skills": ["skills listed as preferred or nice to have"],
  "experience_level": "entry/junior/mid/senior with years if stated",
  "key_responsibilities": ["main responsibilities"],
  "must_have_keywords": ["terms an ATS would screen for"],
  "nice_to_have_keywords": ["secondary terms"]
}

Extract only what the posting states or clearly implies."#;

pub const MATCH_ANALYSIS_PROMPT: &str = r#"Evaluate how well this candidate matches this job, considering the company context.

Candidate profile:
{candidate_profile}

Job requirements:
{job_analysis}

Company context:
{company_context}

Return a JSON object with exactly these fields:
{
  "overall_match_score": 0-100,
  "skills_match": {
    "matching_skills": ["skills the candidate has that the job needs"],
    "missing_skills": ["required skills the candidate lacks"],
    "score": 0-100
  },
  "experience_fit": {
    "assessment": "1-2 sentence assessment",
    "score": 0-100
  },
  "cultural_fit": {
    "assessment": "1-2 sentences on fit with the company culture",
    "score": 0-100
  },
  "strengths": ["specific strengths for this role"],
  "improvement_areas": ["specific areas to improve"],
  "recommendation": "one sentence: should they apply, and how to position themselves"
}

Only list a skill as matching if it appears in the candidate profile."#;

pub const ATS_SCORE_PROMPT: &str = r#"Act as an applicant tracking system screening this resume against the keyword list below.

Resume text:
{resume_text}

Target keywords: {keywords}

Return a JSON object with exactly these fields:
{
  "ats_score": 0-100,
  "keyword_match_percentage": 0-100,
  "matched_keywords": ["keywords from the target list found in the resume"],
  "missing_keywords": ["keywords from the target list not found"],
  "formatting_issues": ["issues that would hurt ATS parsing"],
  "suggestions": ["concrete changes to improve the score"],
  "overall_assessment": "1-2 sentence summary"
}

Count a keyword as matched only if it or a close variant appears in the
resume text. Use only keywords from the target list."#;

pub const SKILLS_GAP_PROMPT: &str = r#"Build an upskilling plan for a student applying to a job they do not fully qualify for yet.

Candidate skills: {candidate_skills}

Job requirements:
{job_analysis}

Skills identified as missing: {missing_skills}

Return a JSON object with exactly these fields:
{
  "gaps": [
    {
      "skill": "skill name",
      "importance": "Critical" | "Important" | "Nice-to-have",
      "learning_resources": ["specific course, docs, or book"],
      "estimated_learning_time": "e.g. 2-3 weeks"
    }
  ],
  "existing_strengths": ["skills the candidate already has that count here"],
  "quick_wins": ["gaps closable within days"],
  "long_term_development": ["skills needing sustained effort"],
  "readiness": "Ready to apply" | "Need 1-2 skills" | "Need significant upskilling",
  "summary": "2-3 sentence honest assessment"
}

Use the importance and readiness labels exactly as written above."#;

pub const PERSONALIZE_PROMPT: &str = r#"Rewrite this candidate's resume content to target a specific job at a specific company.

Candidate profile:
{candidate_profile}

Job requirements:
{job_analysis}

Company research:
{company_research}

Match analysis:
{match_analysis}

Skills gap:
{skills_gap}

Target role: {job_title} at {company_name}

Return a JSON object with exactly these fields:
{
  "branding_headline": "one-line positioning statement for this role",
  "professional_summary": "2-3 sentences targeting this role",
  "career_highlights": ["3-4 strongest points for this job"],
  "skills": {
    "primary_skills": ["skills most relevant to this role, first"],
    "secondary_skills": ["other relevant skills"],
    "tooling": ["tools and platforms"]
  },
  "experience": [
    {
      "title": "",
      "company": "",
      "duration": "",
      "impact_bullets": ["achievement-framed bullet using the job's vocabulary"]
    }
  ],
  "projects": [
    {"name": "", "impact_bullets": [], "tech_stack": []}
  ],
  "education": [
    {"degree": "", "institution": "", "year": "", "cgpa": ""}
  ],
  "certifications": ["only certifications present in the candidate profile"],
  "tailoring_notes": {
    "culture_fit": "how the candidate's background fits this company",
    "interview_talking_points": ["point1"],
    "ats_keywords": ["keywords woven into the rewrite"]
  }
}

Reorder and reword freely, but every employer, project, certification, date,
and metric must come from the candidate profile."#;

pub const COVER_LETTER_PROMPT: &str = r#"Write a concise cover letter for a campus placement application.

Candidate profile:
{candidate_profile}

Target role: {job_title} at {company_name}

Job description:
{job_description}

Company context:
{company_context}

Requirements:
- 3 short paragraphs, under 300 words total
- Specific to this company and role, no generic filler
- Mention 2-3 concrete items from the candidate's background
- Professional but not stiff
- Plain text only, no placeholders like [Company Name]

Use only facts from the candidate profile."#;

pub const CONFIRMATION_EMAIL_PROMPT: &str = r#"Write a short, friendly confirmation email body for a student placement portal.

Context:
{context}

Purpose: {purpose}

Requirements:
- 2 short paragraphs, under 120 words
- Confirm what happened and state any next step
- Plain text only, no subject line, no signature block
- Do not invent dates, names, or details not in the context"#;
